//! Tree Builder: populates the hierarchy store from a directory walk.
//!
//! A single offline pass turns every directory and eligible file under the
//! import root into an [`Entry`](crate::models::Entry) row, mirroring the
//! filesystem nesting through `parent_id` links. The traversal uses an
//! explicit stack rather than call-depth recursion, and each folder's
//! inserts commit as one transaction: a folder that fails to process is
//! logged and its subtree skipped without aborting the import.
//!
//! Processing order across sibling subtrees is stack order (reverse of
//! discovery) and carries no meaning; sibling display order comes from
//! position markers at read time.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::config::{Config, ImportConfig};
use crate::db;
use crate::decode;

/// Counters reported after an import pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImportSummary {
    pub folders: u64,
    pub files: u64,
    pub skipped_folders: u64,
}

/// CLI entry point: imports the configured (or overridden) root and prints
/// a summary.
pub async fn run_import(config: &Config, root_override: Option<PathBuf>) -> Result<()> {
    let root = root_override.unwrap_or_else(|| config.import.root.clone());
    if !root.is_dir() {
        bail!("Import root is not a directory: {}", root.display());
    }

    let pool = db::connect(config).await?;
    crate::migrate::create_schema(&pool).await?;
    let summary = import_tree(&pool, &config.import, &root).await?;
    pool.close().await;

    println!("import {}", root.display());
    println!("  folders imported: {}", summary.folders);
    println!("  files imported: {}", summary.files);
    println!("  folders skipped: {}", summary.skipped_folders);
    println!("ok");
    Ok(())
}

/// Walks `root` and inserts one entry per directory and eligible file.
///
/// The stack is seeded with `(parent_id = None, level = 0, root)`, so the
/// root directory itself becomes a top-level folder entry. Running the
/// import against several roots yields a forest.
pub async fn import_tree(
    pool: &SqlitePool,
    cfg: &ImportConfig,
    root: &Path,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();
    let mut stack: Vec<(Option<i64>, i64, PathBuf)> = vec![(None, 0, root.to_path_buf())];

    while let Some((parent_id, level, folder_path)) = stack.pop() {
        match import_folder(pool, cfg, parent_id, level, &folder_path, &mut summary).await {
            Ok((folder_id, subfolders)) => {
                for child_path in subfolders {
                    stack.push((Some(folder_id), level + 1, child_path));
                }
            }
            Err(e) => {
                error!(folder = %folder_path.display(), error = %e, "skipping folder subtree");
                summary.skipped_folders += 1;
            }
        }
    }

    Ok(summary)
}

/// Imports one folder and its direct file children as a single transaction.
/// Returns the new folder's id and the subdirectories found, for the caller
/// to queue.
async fn import_folder(
    pool: &SqlitePool,
    cfg: &ImportConfig,
    parent_id: Option<i64>,
    level: i64,
    folder_path: &Path,
    summary: &mut ImportSummary,
) -> Result<(i64, Vec<PathBuf>)> {
    let folder_name = folder_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| folder_path.display().to_string());

    // A reserved title file, if present, supplies the folder's content.
    // Display falls back to the folder name when it is absent.
    let title_path = folder_path.join(&cfg.title_file);
    let title = if title_path.is_file() {
        fs::read(&title_path)
            .ok()
            .and_then(|bytes| decode::decode_text(&bytes))
    } else {
        None
    };

    let mut tx = pool.begin().await?;

    let folder_id = sqlx::query(
        "INSERT INTO entries (parent_id, filename, entry_type, content, level) \
         VALUES (?, ?, 'folder', ?, ?)",
    )
    .bind(parent_id)
    .bind(&folder_name)
    .bind(&title)
    .bind(level)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    let mut subfolders = Vec::new();
    let mut files = 0u64;

    let read_dir = fs::read_dir(folder_path)
        .with_context(|| format!("Failed to list folder: {}", folder_path.display()))?;

    for dir_entry in read_dir {
        let dir_entry = dir_entry?;
        let path = dir_entry.path();
        let name = dir_entry.file_name().to_string_lossy().into_owned();

        if path.is_dir() {
            // Queued for a later stack iteration, not descended immediately.
            subfolders.push(path);
            continue;
        }
        if !path.is_file() {
            continue;
        }
        if name == cfg.title_file || name.starts_with('.') {
            continue;
        }

        let file_type = mime_guess::from_path(&path)
            .first()
            .map(|m| m.essence_str().to_string());
        let marker = position_marker(&name);
        let content = if is_text_format(cfg, &name) {
            fs::read(&path)
                .ok()
                .and_then(|bytes| decode::decode_text(&bytes))
        } else {
            None
        };

        sqlx::query(
            "INSERT INTO entries (parent_id, filename, entry_type, file_type, content, position_marker, level) \
             VALUES (?, ?, 'file', ?, ?, ?, ?)",
        )
        .bind(folder_id)
        .bind(&name)
        .bind(&file_type)
        .bind(&content)
        .bind(marker)
        .bind(level + 1)
        .execute(&mut *tx)
        .await?;
        files += 1;
    }

    tx.commit().await?;

    summary.folders += 1;
    summary.files += files;
    info!(folder = %folder_path.display(), files, "imported folder");

    Ok((folder_id, subfolders))
}

/// Extracts the sibling-order marker from a filename: a run of leading
/// digits followed by `-` or `_` (e.g. `12-intro.rtf` → 12). Files without
/// a marker sort after markered siblings at read time.
pub fn position_marker(filename: &str) -> Option<i64> {
    let digits_end = filename
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(filename.len());
    if digits_end == 0 {
        return None;
    }
    match filename[digits_end..].chars().next() {
        Some('-') | Some('_') => filename[..digits_end].parse().ok(),
        _ => None,
    }
}

/// Whether a file's content should be decoded and stored, by extension.
fn is_text_format(cfg: &ImportConfig, filename: &str) -> bool {
    let ext = match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return false,
    };
    cfg.text_extensions
        .iter()
        .any(|e| e.eq_ignore_ascii_case(&ext))
}
