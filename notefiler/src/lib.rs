use std::path::{Path, PathBuf};

use anyhow::Context;
use notefiler_core::config::{find_root, Config};
use notefiler_core::organize::{OrganizeError, Organizer};
use notefiler_core::suggest::ChatSuggester;
use notefiler_extensions::cli::ConsolePrompter;
use notefiler_extensions::gemini::{GeminiChatClient, GeminiConfig};

pub mod cli;
pub mod commands;

pub type ConsoleOrganizer = Organizer<ChatSuggester<GeminiChatClient>, ConsolePrompter>;

/// Everything a command needs, resolved once from the command line and environment.
pub struct AppContext {
    pub root: PathBuf,
    pub config: Config,
    pub api_key: Option<String>,
    pub quiet: bool,
}

impl AppContext {
    /// Resolves the notes root and loads its configuration.
    pub async fn resolve(root: Option<PathBuf>, api_key: Option<String>, quiet: bool) -> anyhow::Result<Self> {
        let root = resolve_root(root).await?;
        let config = Config::load(&root).await
            .with_context(|| format!("Failed to load configuration for {}", root.display()))?;
        Ok(AppContext { root, config, api_key, quiet })
    }

    /// Builds the organizer. Fails before any model or filesystem access if no API key
    /// is configured.
    pub fn organizer(&self) -> Result<ConsoleOrganizer, OrganizeError> {
        let api_key = self.api_key.as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| OrganizeError::ConfigurationMissing("GEMINI_API_KEY".to_string()))?;
        let gemini_config = GeminiConfig::new(api_key)
            .map_err(|e| OrganizeError::ConfigurationMissing(e.to_string()))?;
        let chat = GeminiChatClient::new_with_options(gemini_config, Some(self.config.model.clone()), None)
            .map_err(|e| OrganizeError::ConfigurationMissing(e.to_string()))?;

        let suggester = ChatSuggester::new(chat, self.config.suggest_config());
        Ok(Organizer::new(&self.root, self.config.clone(), suggester, ConsolePrompter::new()))
    }

    /// Prints a progress message unless `--quiet` was given.
    pub fn say(&self, message: impl std::fmt::Display) {
        if !self.quiet {
            println!("{}", message);
        }
    }
}

/// `--root` if given, else the nearest directory with a `.notefiler/` folder, else the
/// current directory. The result is canonical.
async fn resolve_root(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let cwd = std::env::current_dir().context("Cannot determine the current directory")?;
    let root = match explicit {
        Some(root) => root,
        None => find_root(&cwd).await.unwrap_or(cwd),
    };
    canonical_dir(&root).await
}

async fn canonical_dir(path: &Path) -> anyhow::Result<PathBuf> {
    let canonical = tokio::fs::canonicalize(path).await
        .with_context(|| format!("Notes root {} does not exist", path.display()))?;
    anyhow::ensure!(canonical.is_dir(), "Notes root {} is not a directory", canonical.display());
    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn explicit_root_is_canonicalized() {
        let dir = tempdir().unwrap();
        let cx = AppContext::resolve(Some(dir.path().join(".")), None, false).await.unwrap();
        assert_eq!(cx.root, tokio::fs::canonicalize(dir.path()).await.unwrap());
        assert_eq!(cx.config, Config::default());
    }

    #[tokio::test]
    async fn missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(AppContext::resolve(Some(dir.path().join("nope")), None, false).await.is_err());
    }

    #[tokio::test]
    async fn organizer_requires_api_key() {
        let dir = tempdir().unwrap();
        for key in [None, Some("  ".to_string())] {
            let cx = AppContext::resolve(Some(dir.path().to_path_buf()), key, false).await.unwrap();
            assert!(matches!(cx.organizer(), Err(OrganizeError::ConfigurationMissing(_))));
        }
        let cx = AppContext::resolve(Some(dir.path().to_path_buf()), Some("key".to_string()), false).await.unwrap();
        assert!(cx.organizer().is_ok());
    }
}
