//! JSON HTTP server over the hierarchy store.
//!
//! Thin serving layer: each route maps to navigator/store operations and a
//! rendering step, with no state held between requests. Every request opens
//! its own connection scope against the shared store and disconnects.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | List main (top-level) entries |
//! | `GET`  | `/entry/{id}` | Folder details, breadcrumbs, site map, sibling nav |
//! | `GET`  | `/edit/{id}` | Raw entry for editing |
//! | `POST` | `/save` | Update content, then redirect |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! Absent results map to `404`; store failures inside read operations
//! surface as empty structures, never as unhandled faults.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::models::{Crumb, EditEntry, Entry, EntryDetails, SiblingNav, SiteMapNode};
use crate::navigator;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
}

/// Starts the HTTP server on `[server].bind`. Runs until the process is
/// terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let state = AppState {
        config: Arc::new(config.clone()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(handle_index))
        .route("/entry/{id}", get(handle_entry))
        .route("/edit/{id}", get(handle_edit))
        .route("/save", post(handle_save))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    info!(bind = %bind_addr, "server listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

/// Opens the request's connection scope against the store.
async fn request_pool(state: &AppState) -> Result<SqlitePool, AppError> {
    db::connect(&state.config)
        .await
        .map_err(|e| internal(format!("store unavailable: {}", e)))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET / ============

#[derive(Serialize)]
struct IndexResponse {
    main_entries: Vec<Entry>,
}

async fn handle_index(State(state): State<AppState>) -> Result<Json<IndexResponse>, AppError> {
    let pool = request_pool(&state).await?;
    let main_entries = navigator::main_entries(&pool).await;
    pool.close().await;
    Ok(Json(IndexResponse { main_entries }))
}

// ============ GET /entry/{id} ============

#[derive(Serialize)]
struct EntryResponse {
    #[serde(flatten)]
    details: EntryDetails,
    breadcrumbs: Vec<Crumb>,
    base_path: String,
    site_map: Vec<SiteMapNode>,
    #[serde(flatten)]
    siblings: SiblingNav,
}

async fn handle_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<EntryResponse>, AppError> {
    let pool = request_pool(&state).await?;

    let details = navigator::entry_details(&pool, id).await;
    if details.folder.is_none() {
        pool.close().await;
        return Err(not_found(format!("no folder entry with id {}", id)));
    }

    let (breadcrumbs, base_path) = navigator::breadcrumbs(&pool, id).await;
    let siblings = navigator::sibling_navigation(&pool, id).await;
    let site_map = navigator::site_map(&pool).await;
    pool.close().await;

    Ok(Json(EntryResponse {
        details,
        breadcrumbs,
        base_path,
        site_map,
        siblings,
    }))
}

// ============ GET /edit/{id} ============

async fn handle_edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<EditEntry>, AppError> {
    let pool = request_pool(&state).await?;
    let entry = navigator::entry_by_id(&pool, id).await;
    pool.close().await;

    entry
        .map(Json)
        .ok_or_else(|| not_found(format!("no entry with id {}", id)))
}

// ============ POST /save ============

#[derive(Deserialize)]
struct SaveForm {
    id: i64,
    content: String,
    parent_id: Option<i64>,
}

/// Updates an entry's content, then redirects to the parent's entry page,
/// or to the entry itself for top-level entries.
async fn handle_save(
    State(state): State<AppState>,
    Form(form): Form<SaveForm>,
) -> Result<Redirect, AppError> {
    let pool = request_pool(&state).await?;
    let updated = navigator::update_content(&pool, form.id, &form.content)
        .await
        .map_err(|e| internal(format!("update failed: {}", e)));
    pool.close().await;

    if !updated? {
        return Err(not_found(format!("no entry with id {}", form.id)));
    }

    let target = form.parent_id.unwrap_or(form.id);
    Ok(Redirect::to(&format!("/entry/{}", target)))
}
