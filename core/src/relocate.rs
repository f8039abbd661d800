//! Writing a note to its confirmed destination.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, instrument, warn};

use crate::path::{slugify, FolderPath};
use crate::storage::{prune_upward, Error, Note, Result, NOTE_EXTENSION};
use crate::tags::{TagSet, TagStore};

/// Whether a note is filed for the first time or re-filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Reclassify,
}

/// Confirmed destination and tags for a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub tags: TagSet,
    pub folder: FolderPath,
    /// File name without extension.
    pub file_name: String,
}

impl Placement {
    /// Path of the note file relative to the notes root.
    pub fn relative_path(&self) -> PathBuf {
        self.folder.to_path(Path::new("")).join(format!("{}.{}", self.file_name, NOTE_EXTENSION))
    }
}

/// Result of a successful relocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    /// Absolute path of the written note.
    pub path: PathBuf,
    /// The original file was deleted; the caller should switch to `path`.
    pub reopen: bool,
}

pub struct NoteRelocator {
    root: PathBuf,
    tag_store: TagStore,
}

impl NoteRelocator {
    /// `root` should be canonical so it compares equal to paths of loaded notes.
    pub fn new(root: impl Into<PathBuf>, tag_store: TagStore) -> Self {
        NoteRelocator { root: root.into(), tag_store }
    }

    /// The note content as it will be written for `placement`.
    pub fn render(&self, note: &Note, placement: &Placement, mode: Mode) -> String {
        let content = match mode {
            Mode::Create => note.content().to_string(),
            Mode::Reclassify => self.tag_store.strip(note.content()),
        };
        self.tag_store.apply(&content, &placement.tags)
    }

    /// Tags `note` and writes it to `placement` below the root.
    ///
    /// A saved, unmodified note that ends up at a new path has its old file removed
    /// and the emptied directories above it pruned. Unsaved or modified notes are never
    /// deleted. Fails without writing anything if a different file already occupies
    /// the destination.
    #[instrument(skip(self, note, mode), fields(source = ?note.path(), mode = ?mode))]
    pub async fn relocate(&self, note: &Note, placement: &Placement, mode: Mode) -> Result<Relocation> {
        let file_name = slugify(&placement.file_name);
        if file_name.is_empty() {
            return Err(Error::InvalidPath(placement.file_name.clone()));
        }
        let dest_dir = placement.folder.to_path(&self.root);
        let destination = dest_dir.join(format!("{}.{}", file_name, NOTE_EXTENSION));
        let content = self.render(note, placement, mode);

        if fs::try_exists(&destination).await? {
            let existing = fs::canonicalize(&destination).await?;
            if note.path() != Some(existing.as_path()) {
                return Err(Error::DestinationExists(existing));
            }
        }

        self.write_note(&dest_dir, &destination, &content).await?;
        let destination = fs::canonicalize(&destination).await?;
        debug!("Wrote note to {}", destination.display());

        let mut reopen = false;
        if let Some(source) = note.path() {
            if source != destination {
                if note.is_modified() {
                    info!("Source has unsaved changes; leaving it in place");
                } else {
                    fs::remove_file(source).await?;
                    reopen = true;
                    if let Some(parent) = source.parent() {
                        // Pruning is best effort once the note is written
                        if let Err(e) = prune_upward(parent, &self.root).await {
                            warn!(error = %e, "Failed to prune empty directories");
                        }
                    }
                }
            }
        }

        info!(destination = %destination.display(), "Note relocated");
        Ok(Relocation { path: destination, reopen })
    }

    /// Creates `dest_dir` and writes the note. A failed write removes any directories
    /// left empty below the root.
    async fn write_note(&self, dest_dir: &Path, destination: &Path, content: &str) -> Result<()> {
        fs::create_dir_all(dest_dir).await?;
        if let Err(e) = fs::write(destination, content).await {
            if let Err(prune) = prune_upward(dest_dir, &self.root).await {
                warn!(error = %prune, "Failed to prune directories after write error");
            }
            return Err(e.into());
        }
        Ok(())
    }
}
