//! Per-root configuration stored in `.notefiler/config.json`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, instrument, warn};

use crate::storage::{Error, Result, CONFIG_FILENAME, INTERNAL_DIR_NAME};
use crate::suggest::SuggestConfig;
use crate::tags::TagStore;

pub const CONFIG_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Version of the file format, for future migrations.
    pub version: u32,
    /// How tags are written into notes.
    pub tag_store: TagStore,
    /// How many folder levels to offer as destinations.
    pub max_depth: usize,
    /// How many similar folders to offer next to the suggested one.
    pub top_n: usize,
    /// Chat model used for suggestions.
    pub model: String,
    pub temperature: Option<f32>,
    /// Attempts at getting a usable suggestion before giving up.
    pub max_attempts: u32,
    /// File extensions treated as notes.
    pub extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version: CONFIG_VERSION,
            tag_store: TagStore::default(),
            max_depth: 3,
            top_n: 5,
            model: "gemini-2.0-flash".to_string(),
            temperature: Some(0.2),
            max_attempts: 3,
            extensions: vec!["md".to_string(), "markdown".to_string()],
        }
    }
}

impl Config {
    /// Location of the configuration file for `root`.
    pub fn path(root: &Path) -> PathBuf {
        root.join(INTERNAL_DIR_NAME).join(CONFIG_FILENAME)
    }

    /// Loads the configuration of `root`, falling back to defaults if there is none.
    #[instrument(skip(root), fields(root = %root.display()))]
    pub async fn load(root: &Path) -> Result<Config> {
        let path = Self::path(root);
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No configuration file, using defaults");
                return Ok(Config::default());
            }
            Err(e) => return Err(Error::Io(e)),
        };

        serde_json::from_slice(&content).map_err(|e| {
            warn!("Failed to parse configuration file '{}': {}", path.display(), e);
            Error::InvalidConfig(path)
        })
    }

    /// Writes this configuration for `root`. Refuses to replace an existing file unless
    /// `overwrite` is set.
    #[instrument(skip(self, root), fields(root = %root.display()))]
    pub async fn save(&self, root: &Path, overwrite: bool) -> Result<PathBuf> {
        let path = Self::path(root);
        if !overwrite && fs::try_exists(&path).await? {
            return Err(Error::ConfigExists(path));
        }
        fs::create_dir_all(root.join(INTERNAL_DIR_NAME)).await?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content).await?;
        debug!("Configuration written to {}", path.display());
        Ok(path)
    }

    pub fn suggest_config(&self) -> SuggestConfig {
        SuggestConfig {
            model: Some(self.model.clone()),
            temperature: self.temperature,
            max_attempts: self.max_attempts,
        }
    }
}

/// Walks up from `start` looking for a directory that holds `.notefiler`.
pub async fn find_root(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        if fs::metadata(current.join(INTERNAL_DIR_NAME)).await.map(|m| m.is_dir()).unwrap_or(false) {
            return Some(current.to_path_buf());
        }
        dir = current.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        assert_eq!(Config::load(dir.path()).await.unwrap(), Config::default());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempdir().unwrap();
        let config = Config { tag_store: TagStore::InlineLine, top_n: 2, ..Default::default() };
        let path = config.save(dir.path(), false).await.unwrap();
        assert!(path.ends_with(".notefiler/config.json"));
        assert_eq!(Config::load(dir.path()).await.unwrap(), config);

        assert!(matches!(config.save(dir.path(), false).await, Err(Error::ConfigExists(_))));
        assert!(config.save(dir.path(), true).await.is_ok());
    }

    #[tokio::test]
    async fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(INTERNAL_DIR_NAME)).await.unwrap();
        fs::write(Config::path(dir.path()), r#"{ "tag_store": "inline_line" }"#).await.unwrap();

        let config = Config::load(dir.path()).await.unwrap();
        assert_eq!(config.tag_store, TagStore::InlineLine);
        assert_eq!(config.max_attempts, 3);
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(INTERNAL_DIR_NAME)).await.unwrap();
        fs::write(Config::path(dir.path()), "{ not json").await.unwrap();
        assert!(matches!(Config::load(dir.path()).await, Err(Error::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn find_root_walks_up() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".notefiler")).await.unwrap();
        fs::create_dir_all(dir.path().join("a/b")).await.unwrap();

        let found = find_root(&dir.path().join("a/b")).await;
        assert_eq!(found.as_deref(), Some(dir.path()));
    }
}
