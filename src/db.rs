//! Store connection handling.
//!
//! Every caller — one CLI command, one HTTP request, one import pass —
//! opens its own connection scope against the SQLite file and closes it
//! when done; nothing is shared between requests. Operations within a
//! scope run sequentially (point lookups, bounded traversals, at most one
//! single-row write), so each scope gets exactly one connection. WAL mode
//! keeps interleaved read scopes cheap.

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::Config;

/// Opens the entries store, creating the database file and its parent
/// directory on first use.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let db_path = &config.db.path;

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    Ok(pool)
}
