use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    create_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Creates the `entries` table and its indexes. Idempotent.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            parent_id INTEGER,
            filename TEXT NOT NULL,
            entry_type TEXT NOT NULL CHECK (entry_type IN ('folder', 'file')),
            file_type TEXT,
            content TEXT,
            position_marker INTEGER,
            level INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (parent_id) REFERENCES entries(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_entries_parent_id ON entries(parent_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_entries_type ON entries(entry_type)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_entries_level ON entries(level)")
        .execute(pool)
        .await?;

    Ok(())
}
