//! Google Gemini provider for [`notefiler_core::chat::ChatApi`].

mod chat;
mod error;
mod shared;

pub use chat::{GeminiChatClient, DEFAULT_GEMINI_CHAT_MODEL};
pub use error::{GeminiError, GeminiErrorDetail};
pub use shared::GeminiConfig;
