//! The complete "file this note" operation.
//!
//! [`Organizer::run`] scans the existing folders, asks the [`Suggester`] for a
//! placement, lets the user review it through the [`Prompter`] and finally hands the
//! confirmed [`Placement`] to the [`NoteRelocator`]. Nothing on disk changes until the
//! user has confirmed, so a cancelled or failed run leaves no trace.

use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::path::{rank, slugify, FolderPath, ScoredFolder};
use crate::prompt::{PromptError, Prompter};
use crate::relocate::{Mode, NoteRelocator, Placement, Relocation};
use crate::storage::{self, list_folders, Note};
use crate::suggest::{SuggestError, Suggester, Suggestion};
use crate::tags::TagSet;

#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("Required setting is missing: {0}")]
    ConfigurationMissing(String),

    #[error("There is no note to organize")]
    NoActiveDocument,

    #[error("Not a Markdown note: {0}")]
    UnsupportedDocumentType(PathBuf),

    #[error("Could not get a suggestion from the model")]
    AiRequestFailed(#[source] SuggestError),

    #[error("Cancelled by the user")]
    UserCancelled,

    #[error("Prompt failed")]
    Prompt(#[source] PromptError),

    #[error("Filesystem operation failed")]
    Filesystem(#[from] storage::Error),
}

impl From<PromptError> for OrganizeError {
    fn from(e: PromptError) -> Self {
        match e {
            PromptError::Canceled => OrganizeError::UserCancelled,
            other => OrganizeError::Prompt(other),
        }
    }
}

/// A suggestion together with the existing folders most similar to it.
#[derive(Debug, Clone)]
pub struct Proposal {
    pub suggestion: Suggestion,
    pub similar: Vec<ScoredFolder>,
}

pub struct Organizer<S, P> {
    root: PathBuf,
    config: Config,
    suggester: S,
    prompter: P,
}

impl<S: Suggester, P: Prompter> Organizer<S, P> {
    /// `root` should be canonical; see [`NoteRelocator::new`].
    pub fn new(root: impl Into<PathBuf>, config: Config, suggester: S, prompter: P) -> Self {
        Organizer { root: root.into(), config, suggester, prompter }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_parts(self) -> (S, P) {
        (self.suggester, self.prompter)
    }

    /// Asks for a suggestion for `note` without touching the filesystem.
    #[instrument(skip_all, fields(path = ?note.path()))]
    pub async fn propose(&self, note: &Note) -> Result<Proposal, OrganizeError> {
        self.check(note)?;
        let folders = list_folders(&self.root, self.config.max_depth).await;
        let suggestion = self.suggester.suggest(note.content(), &folders).await
            .map_err(OrganizeError::AiRequestFailed)?;
        let similar = rank(&folders, &suggestion.folder, self.config.top_n);
        debug!(?suggestion, similar = similar.len(), "Built proposal");
        Ok(Proposal { suggestion, similar })
    }

    /// Files `note`: suggest, review with the user, then relocate.
    #[instrument(skip_all, fields(path = ?note.path(), mode = ?mode))]
    pub async fn run(&self, note: Note, mode: Mode) -> Result<Relocation, OrganizeError> {
        let proposal = self.propose(&note).await?;
        let placement = self.review(&proposal).await?;

        let relocator = NoteRelocator::new(self.root.clone(), self.config.tag_store);
        let relocation = relocator.relocate(&note, &placement, mode).await?;
        info!(path = %relocation.path.display(), "Note filed");
        Ok(relocation)
    }

    /// Waits for a draft to be saved, then files it.
    ///
    /// Exactly one note is taken from `saved`. If the sender is dropped without
    /// sending, the draft was abandoned and the run counts as cancelled.
    pub async fn run_after_save(&self, saved: oneshot::Receiver<Note>, mode: Mode) -> Result<Relocation, OrganizeError> {
        let note = saved.await.map_err(|_| OrganizeError::UserCancelled)?;
        debug!("Draft saved, filing it");
        self.run(note, mode).await
    }

    fn check(&self, note: &Note) -> Result<(), OrganizeError> {
        if !note.has_extension(&self.config.extensions) {
            let path = note.path().map(PathBuf::from).unwrap_or_default();
            return Err(OrganizeError::UnsupportedDocumentType(path));
        }
        if note.content().trim().is_empty() {
            return Err(OrganizeError::NoActiveDocument);
        }
        Ok(())
    }

    /// Lets the user edit tags, folder and name. Empty answers fall back to the
    /// suggestion; only an explicit cancel aborts.
    async fn review(&self, proposal: &Proposal) -> Result<Placement, OrganizeError> {
        let suggestion = &proposal.suggestion;

        let tags = self.prompter.edit("Tags", &suggestion.tags.to_string(), &[]).await?;

        let mut completions = vec![suggestion.folder.to_string()];
        for similar in &proposal.similar {
            let folder = similar.folder.to_string();
            if !completions.contains(&folder) {
                completions.push(folder);
            }
        }
        let folder = self.prompter.edit("Folder", &suggestion.folder.to_string(), &completions).await?;

        let file_name = self.prompter.edit("File name", &suggestion.file_name, &[]).await?;
        let file_name = match slugify(&file_name) {
            name if name.is_empty() => suggestion.file_name.clone(),
            name => name,
        };

        let placement = Placement {
            tags: TagSet::parse(&tags),
            folder: FolderPath::parse(&folder),
            file_name,
        };
        let summary = format!(
            "Move to {} with tags [{}]?",
            placement.relative_path().display(),
            placement.tags
        );
        if !self.prompter.confirm(&summary).await? {
            return Err(OrganizeError::UserCancelled);
        }
        Ok(placement)
    }
}
