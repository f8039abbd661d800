//! Suggestions for where a note belongs.
//!
//! A [`Suggester`] looks at the text of a note and the folders that already exist and
//! proposes tags, a folder and a file name. The production implementation,
//! [`ChatSuggester`], asks a chat model.

use async_trait::async_trait;
use thiserror::Error;

use crate::chat::ChatError;
use crate::path::FolderPath;
use crate::tags::TagSet;

mod chat;

pub use chat::ChatSuggester;

/// Proposed filing of a note, before the user has reviewed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub tags: TagSet,
    pub folder: FolderPath,
    /// File name stem, already slugified.
    pub file_name: String,
}

/// Settings for a suggestion request, passed in explicitly at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestConfig {
    /// Model to use; `None` leaves the choice to the provider client.
    pub model: Option<String>,
    pub temperature: Option<f32>,
    /// Total attempts before giving up. Zero is treated as one.
    pub max_attempts: u32,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        SuggestConfig {
            model: None,
            temperature: None,
            max_attempts: 3,
        }
    }
}

#[async_trait]
pub trait Suggester: Send + Sync {
    async fn suggest(&self, note_text: &str, existing_folders: &[FolderPath]) -> Result<Suggestion, SuggestError>;
}


#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("Chat request failed: {0}")]
    Chat(#[from] ChatError),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Model response could not be understood: {0}")]
    MalformedResponse(String),

    #[error("No usable suggestion after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<SuggestError>,
    },
}
