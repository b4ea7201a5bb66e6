use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub import: ImportConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    /// Root directory whose tree is imported. The root itself becomes a
    /// top-level folder entry.
    pub root: PathBuf,
    /// Reserved per-folder file whose decoded text becomes the folder's
    /// content. Never imported as a file entry itself.
    #[serde(default = "default_title_file")]
    pub title_file: String,
    /// Extensions (without the dot) whose file content is decoded and
    /// stored. Everything else is imported metadata-only.
    #[serde(default = "default_text_extensions")]
    pub text_extensions: Vec<String>,
}

fn default_title_file() -> String {
    "titel.rtf".to_string()
}

fn default_text_extensions() -> Vec<String> {
    vec!["rtf".to_string(), "md".to_string(), "txt".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.import.title_file.is_empty() {
        anyhow::bail!("import.title_file must not be empty");
    }

    if config
        .import
        .title_file
        .contains(std::path::is_separator)
    {
        anyhow::bail!("import.title_file must be a bare filename, not a path");
    }

    if config.import.text_extensions.iter().any(|e| e.is_empty()) {
        anyhow::bail!("import.text_extensions must not contain empty entries");
    }

    if config.server.bind.is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    Ok(config)
}
