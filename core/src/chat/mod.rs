//! Minimal chat-completion abstraction used to obtain filing suggestions.
//!
//! Only plain text exchanges are modelled. Providers live in the extensions crate and
//! implement [`ChatApi`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod error;

pub use error::ChatError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    System(String),
    User(String),
    Assistant(String),
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Message::System(text.into())
    }

    pub fn user(text: impl Into<String>) -> Self {
        Message::User(text.into())
    }

    pub fn text(&self) -> &str {
        match self {
            Message::System(text) | Message::User(text) | Message::Assistant(text) => text,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatOptions {
    pub model_id: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Ask the provider to constrain output, e.g. `application/json`.
    pub response_mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Text generated by the model, with all parts concatenated.
    pub text: String,
    pub usage: Option<UsageInfo>,
    pub finish_reason: Option<FinishReason>,
    pub model_id: Option<String>,
}

#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Sends the conversation and returns the model's reply.
    async fn generate(&self, messages: &[Message], options: &ChatOptions) -> Result<ChatResponse, ChatError>;
}

#[async_trait]
impl<T: ChatApi + ?Sized> ChatApi for Box<T> {
    async fn generate(&self, messages: &[Message], options: &ChatOptions) -> Result<ChatResponse, ChatError> {
        (**self).generate(messages, options).await
    }
}
