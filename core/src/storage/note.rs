use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, instrument};

use super::{Error, Result};

/// A Markdown note, either loaded from disk or still living only in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    // Absolute path, `None` for a draft that was never saved
    path: Option<PathBuf>,
    content: String,
    modified: bool,
}

impl Note {
    /// Reads a note from disk. The stored path is canonicalized.
    #[instrument(skip(path), fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Note> {
        let meta = fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        if !meta.is_file() {
            return Err(Error::NotAFile(path.to_path_buf()));
        }

        let absolute_path = fs::canonicalize(path).await?;
        let content = fs::read_to_string(&absolute_path).await?;
        debug!(bytes = content.len(), "Loaded note");
        Ok(Note {
            path: Some(absolute_path),
            content,
            modified: false,
        })
    }

    /// Creates an in-memory note that has no file yet.
    pub fn unsaved(content: impl Into<String>) -> Note {
        Note {
            path: None,
            content: content.into(),
            modified: true,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether the in-memory content differs from what was last read or written.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.modified = true;
    }

    /// Whether this is a Markdown note according to `extensions`. Unsaved notes are
    /// always treated as Markdown.
    pub fn has_extension(&self, extensions: &[String]) -> bool {
        let Some(path) = &self.path else {
            return true;
        };
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    /// Writes the current content back to the note's own file.
    pub async fn save(&mut self) -> Result<()> {
        let path = self.path.as_ref().ok_or(Error::Unsaved)?;
        fs::write(path, &self.content).await?;
        self.modified = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn load_reads_content_and_is_clean() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.md");
        fs::write(&path, "# A\n").await.unwrap();

        let note = Note::load(&path).await.unwrap();
        assert_eq!(note.content(), "# A\n");
        assert!(note.path().is_some());
        assert!(!note.is_modified());
        assert!(note.path().unwrap().is_absolute());
    }

    #[tokio::test]
    async fn load_errors() {
        let dir = tempdir().unwrap();
        let missing = Note::load(&dir.path().join("missing.md")).await;
        assert!(matches!(missing, Err(Error::FileNotFound(_))));
        let not_file = Note::load(dir.path()).await;
        assert!(matches!(not_file, Err(Error::NotAFile(_))));
    }

    #[tokio::test]
    async fn save_clears_modified_flag() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.md");
        fs::write(&path, "old").await.unwrap();

        let mut note = Note::load(&path).await.unwrap();
        note.set_content("new");
        assert!(note.is_modified());
        note.save().await.unwrap();
        assert!(!note.is_modified());
        assert_eq!(fs::read_to_string(&path).await.unwrap(), "new");

        let mut draft = Note::unsaved("draft");
        assert!(matches!(draft.save().await, Err(Error::Unsaved)));
    }

    #[test]
    fn extension_check() {
        let exts = vec!["md".to_string(), "markdown".to_string()];
        assert!(Note::unsaved("x").has_extension(&exts));
        let note = Note { path: Some(PathBuf::from("/n/a.MD")), content: String::new(), modified: false };
        assert!(note.has_extension(&exts));
        let note = Note { path: Some(PathBuf::from("/n/a.txt")), content: String::new(), modified: false };
        assert!(!note.has_extension(&exts));
    }
}
