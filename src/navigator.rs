//! Read-side algorithms over the hierarchy store.
//!
//! Breadcrumb computation, sibling navigation, site-map reconstruction,
//! categorized folder listings, and the single write path (content update).
//! Every operation re-reads the committed store; nothing is cached between
//! calls.
//!
//! All read operations are total: store failures are logged and surface as
//! empty results, so the serving layer only ever maps absent values to
//! "not found" responses.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{error, warn};

use crate::models::{
    CategorizedEntries, Crumb, EditEntry, Entry, EntryDetails, EntryType, FolderSummary, NavLink,
    RenderedEntry, SiblingNav, SiteMapNode,
};
use crate::render;

const ENTRY_COLUMNS: &str =
    "id, parent_id, filename, entry_type, file_type, content, position_marker, level";

/// Sibling display order: ascending position marker with unmarkered
/// entries after all markered ones, ties broken by id.
const SIBLING_ORDER: &str = "position_marker ASC NULLS LAST, id ASC";

fn entry_from_row(row: &SqliteRow) -> Entry {
    let type_str: String = row.get("entry_type");
    Entry {
        id: row.get("id"),
        parent_id: row.get("parent_id"),
        filename: row.get("filename"),
        entry_type: EntryType::parse(&type_str).unwrap_or(EntryType::File),
        file_type: row.get("file_type"),
        content: row.get("content"),
        position_marker: row.get("position_marker"),
        level: row.get("level"),
    }
}

// ---- Main entries ----

/// All top-level entries (absent `parent_id`), in insertion order.
pub async fn main_entries(pool: &SqlitePool) -> Vec<Entry> {
    match fetch_main_entries(pool).await {
        Ok(entries) => entries,
        Err(e) => {
            error!(error = %e, "failed to fetch main entries");
            Vec::new()
        }
    }
}

async fn fetch_main_entries(pool: &SqlitePool) -> sqlx::Result<Vec<Entry>> {
    let rows = sqlx::query(&format!(
        "SELECT {ENTRY_COLUMNS} FROM entries WHERE parent_id IS NULL ORDER BY id ASC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(entry_from_row).collect())
}

// ---- Breadcrumbs ----

/// Ancestor chain for an entry, root-first, plus the slash-joined path of
/// crumb filenames. Unknown ids and store failures yield an empty trail.
pub async fn breadcrumbs(pool: &SqlitePool, entry_id: i64) -> (Vec<Crumb>, String) {
    let crumbs = match walk_ancestors(pool, entry_id).await {
        Ok(crumbs) => crumbs,
        Err(e) => {
            error!(entry_id, error = %e, "failed to fetch breadcrumbs");
            Vec::new()
        }
    };

    if crumbs.is_empty() {
        warn!(entry_id, "no breadcrumbs: entry not found");
    }

    let base_path = crumbs
        .iter()
        .map(|c| c.filename.as_str())
        .collect::<Vec<_>>()
        .join("/");
    (crumbs, base_path)
}

/// Follows `parent_id` references until a root is reached, then reverses
/// to root-first order. A visited set terminates the walk if the store
/// ever holds a cycle.
async fn walk_ancestors(pool: &SqlitePool, entry_id: i64) -> sqlx::Result<Vec<Crumb>> {
    let mut crumbs = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor = Some(entry_id);

    while let Some(id) = cursor {
        if !seen.insert(id) {
            warn!(entry_id, cycle_at = id, "parent chain contains a cycle");
            break;
        }
        let row = sqlx::query("SELECT id, parent_id, filename, level FROM entries WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        match row {
            Some(row) => {
                crumbs.push(Crumb {
                    id: row.get("id"),
                    filename: row.get("filename"),
                    level: row.get("level"),
                });
                cursor = row.get("parent_id");
            }
            None => break,
        }
    }

    crumbs.reverse();
    Ok(crumbs)
}

// ---- Site map ----

/// The full nested tree of folder entries, as a forest of top-level nodes.
///
/// Built O(F) in the folder count: one query, one parent-to-children
/// grouping pass, then recursive assembly from the grouping map.
pub async fn site_map(pool: &SqlitePool) -> Vec<SiteMapNode> {
    let rows = match fetch_folder_rows(pool).await {
        Ok(rows) => rows,
        Err(e) => {
            error!(error = %e, "failed to fetch site map");
            return Vec::new();
        }
    };

    let mut children_of: HashMap<Option<i64>, Vec<FolderRow>> = HashMap::new();
    for row in rows {
        children_of.entry(row.parent_id).or_default().push(row);
    }

    assemble_nodes(&children_of, None)
}

struct FolderRow {
    id: i64,
    display_name: String,
    parent_id: Option<i64>,
    level: i64,
}

async fn fetch_folder_rows(pool: &SqlitePool) -> sqlx::Result<Vec<FolderRow>> {
    let rows = sqlx::query(
        "SELECT id, COALESCE(content, filename) AS display_name, parent_id, level \
         FROM entries WHERE entry_type = 'folder' \
         ORDER BY level ASC, parent_id ASC, id ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| FolderRow {
            id: row.get("id"),
            display_name: row.get::<String, _>("display_name").trim().to_string(),
            parent_id: row.get("parent_id"),
            level: row.get("level"),
        })
        .collect())
}

fn assemble_nodes(
    children_of: &HashMap<Option<i64>, Vec<FolderRow>>,
    parent: Option<i64>,
) -> Vec<SiteMapNode> {
    children_of
        .get(&parent)
        .into_iter()
        .flatten()
        .map(|row| SiteMapNode {
            id: row.id,
            display_name: row.display_name.clone(),
            parent_id: row.parent_id,
            level: row.level,
            children: assemble_nodes(children_of, Some(row.id)),
        })
        .collect()
}

// ---- Sibling navigation ----

/// The previous and next sibling folders of an entry, under its parent,
/// in sibling display order. Absent at the first/last position and for
/// top-level entries.
pub async fn sibling_navigation(pool: &SqlitePool, entry_id: i64) -> SiblingNav {
    let siblings = match fetch_sibling_folders(pool, entry_id).await {
        Ok(siblings) => siblings,
        Err(e) => {
            error!(entry_id, error = %e, "failed to fetch sibling navigation");
            return SiblingNav::default();
        }
    };

    let Some(pos) = siblings.iter().position(|s| s.id == entry_id) else {
        return SiblingNav::default();
    };

    SiblingNav {
        previous: pos.checked_sub(1).map(|i| siblings[i].clone()),
        next: siblings.get(pos + 1).cloned(),
    }
}

async fn fetch_sibling_folders(pool: &SqlitePool, entry_id: i64) -> sqlx::Result<Vec<NavLink>> {
    let rows = sqlx::query(&format!(
        "SELECT id, COALESCE(content, filename) AS display_name \
         FROM entries \
         WHERE parent_id = (SELECT parent_id FROM entries WHERE id = ?) \
           AND entry_type = 'folder' \
         ORDER BY {SIBLING_ORDER}"
    ))
    .bind(entry_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| NavLink {
            id: row.get("id"),
            label: row.get::<String, _>("display_name").trim().to_string(),
        })
        .collect())
}

// ---- Entry details ----

/// One folder entry plus its children partitioned into categories, with
/// each child's content rendered to markup. An id that does not resolve
/// to a folder yields an absent folder and all-empty categories.
pub async fn entry_details(pool: &SqlitePool, folder_id: i64) -> EntryDetails {
    match fetch_entry_details(pool, folder_id).await {
        Ok(details) => details,
        Err(e) => {
            error!(folder_id, error = %e, "failed to fetch entry details");
            EntryDetails::default()
        }
    }
}

async fn fetch_entry_details(pool: &SqlitePool, folder_id: i64) -> sqlx::Result<EntryDetails> {
    let folder_row = sqlx::query(
        "SELECT id, filename, content FROM entries WHERE id = ? AND entry_type = 'folder'",
    )
    .bind(folder_id)
    .fetch_optional(pool)
    .await?;

    let Some(folder_row) = folder_row else {
        warn!(folder_id, "no folder entry found");
        return Ok(EntryDetails::default());
    };

    let folder = FolderSummary {
        id: folder_row.get("id"),
        filename: folder_row.get("filename"),
        content: folder_row.get("content"),
    };

    let child_rows = sqlx::query(&format!(
        "SELECT {ENTRY_COLUMNS} FROM entries WHERE parent_id = ? ORDER BY {SIBLING_ORDER}"
    ))
    .bind(folder_id)
    .fetch_all(pool)
    .await?;

    let mut entries = CategorizedEntries::default();
    for row in &child_rows {
        let child = entry_from_row(row);
        let has_content = matches!(child.content.as_deref(), Some(c) if !c.is_empty());
        let rendered = RenderedEntry {
            id: child.id,
            filename: child.filename,
            entry_type: child.entry_type,
            file_type: child.file_type.clone(),
            content: render::render_optional(child.content.as_deref()),
            position_marker: child.position_marker,
        };

        let file_type = child.file_type.as_deref().unwrap_or("");
        if rendered.entry_type == EntryType::Folder {
            entries.folders.push(rendered);
        } else if file_type.starts_with("image/") {
            entries.images.push(rendered);
        } else if file_type.starts_with("audio/") {
            entries.audio.push(rendered);
        } else if file_type.starts_with("video/") {
            entries.videos.push(rendered);
        } else if has_content {
            entries.text.push(rendered);
        } else {
            entries.other.push(rendered);
        }
    }

    Ok(EntryDetails {
        folder: Some(folder),
        entries,
    })
}

// ---- Raw entry (edit path) ----

/// A single entry with unrendered content, for the edit form.
pub async fn entry_by_id(pool: &SqlitePool, entry_id: i64) -> Option<EditEntry> {
    let row = sqlx::query("SELECT id, parent_id, filename, content FROM entries WHERE id = ?")
        .bind(entry_id)
        .fetch_optional(pool)
        .await;

    match row {
        Ok(Some(row)) => Some(EditEntry {
            id: row.get("id"),
            parent_id: row.get("parent_id"),
            filename: row.get("filename"),
            content: row.get("content"),
        }),
        Ok(None) => {
            warn!(entry_id, "no entry found");
            None
        }
        Err(e) => {
            error!(entry_id, error = %e, "failed to fetch entry");
            None
        }
    }
}

// ---- Content update ----

/// Overwrites an entry's content. Unconditional: last writer wins, no
/// version check. Returns whether a row was affected.
pub async fn update_content(pool: &SqlitePool, entry_id: i64, content: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE entries SET content = ? WHERE id = ?")
        .bind(content)
        .bind(entry_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
