use async_trait::async_trait;
use thiserror::Error;

/// Trait for asking the user to review suggestions.
///
/// This trait abstracts the input method for different front ends. Cancelling is
/// reported as [`PromptError::Canceled`], never as an empty answer.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Lets the user edit `default` and returns the confirmed text.
    ///
    /// `completions` are values the front end may offer while typing.
    async fn edit(&self, label: &str, default: &str, completions: &[String]) -> Result<String, PromptError>;

    /// Shows `summary` and asks for a yes/no confirmation.
    async fn confirm(&self, summary: &str) -> Result<bool, PromptError>;
}


#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt was canceled by the user.")]
    Canceled,

    #[error("Prompt input failed due to IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Prompt failed to execute to completion: {0}")]
    Async(#[from] tokio::task::JoinError),
}
