//! # Waypost CLI (`waypost`)
//!
//! The `waypost` binary is the primary interface for Waypost. It provides
//! commands for database initialization, directory-tree import, hierarchy
//! inspection, content editing, and starting the HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! waypost --config ./config/waypost.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `waypost init` | Create the SQLite database and run schema migrations |
//! | `waypost import` | Import the configured directory tree into the store |
//! | `waypost get <id>` | Print one entry with breadcrumbs and siblings |
//! | `waypost tree` | Print the full site map as an indented tree |
//! | `waypost set <id> <content>` | Overwrite one entry's content |
//! | `waypost serve` | Start the JSON HTTP server |

mod config;
mod db;
mod decode;
mod import;
mod migrate;
mod models;
mod navigator;
mod render;
mod server;
mod show;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Waypost — a hierarchical document store and browser for
/// directory-based rich-text content.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file with `[db]`, `[import]`, and `[server]` sections.
#[derive(Parser)]
#[command(
    name = "waypost",
    about = "Waypost — a hierarchical document store and browser for directory-based content",
    version,
    long_about = "Waypost imports a directory tree of rich-text documents into a SQLite \
    hierarchy of parent-linked entries, then serves that hierarchy as browsable, editable \
    content: breadcrumbs, sibling navigation, a site map, and categorized folder listings."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/waypost.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the `entries` table with its
    /// indexes. Idempotent — running it multiple times is safe.
    Init,

    /// Import a directory tree into the store.
    ///
    /// Walks the configured root (or `--root`), turning every directory
    /// and eligible file into an entry. Hidden files and the reserved
    /// title file are skipped; a failing folder is logged and its subtree
    /// skipped without aborting the import. Run offline: the import is
    /// not designed to run concurrently with live serving.
    Import {
        /// Override the import root from the config file.
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Print one entry with its breadcrumbs, siblings, and children.
    Get {
        /// Entry id.
        id: i64,

        /// Emit the entry and its navigation context as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the full site map as an indented tree of folders.
    Tree {
        /// Emit the site map forest as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Overwrite one entry's content.
    ///
    /// The edit path: an unconditional single-row update. Last writer
    /// wins; Waypost assumes a single editor.
    Set {
        /// Entry id.
        id: i64,
        /// New content (stored as-is; rendered at the serving boundary).
        content: String,
    },

    /// Start the JSON HTTP server.
    ///
    /// Serves main entries, folder details with breadcrumbs and sibling
    /// navigation, the site map, and the edit/save surface on the address
    /// configured in `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Import { root } => {
            import::run_import(&cfg, root).await?;
        }
        Commands::Get { id, json } => {
            show::run_get(&cfg, id, json).await?;
        }
        Commands::Tree { json } => {
            show::run_tree(&cfg, json).await?;
        }
        Commands::Set { id, content } => {
            show::run_set(&cfg, id, &content).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
