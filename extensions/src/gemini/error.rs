use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use notefiler_core::chat::ChatError;

/// Error body returned by the Gemini API.
#[derive(Deserialize, Debug, Clone)]
pub struct GeminiErrorResponse {
    pub error: GeminiErrorDetail,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GeminiErrorDetail {
    pub code: u16,
    pub message: String,
    /// e.g. "INVALID_ARGUMENT", "UNAUTHENTICATED"
    pub status: String,
}

/// Failures inside the Gemini client. Converted into [`ChatError`] at the trait boundary.
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to serialize request body: {0}")]
    RequestSerialization(#[source] serde_json::Error),

    #[error("Failed to parse response body ({context}): {source}")]
    ResponseParsing {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Gemini API error: status={status}, message='{body_text}'")]
    ApiError {
        status: StatusCode,
        detail: Option<GeminiErrorDetail>,
        body_text: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The prompt or the answer was blocked by the provider's safety filters.
    #[error("Content blocked: {0}")]
    Blocked(String),
}

/// Turns a non-success response into `GeminiError::ApiError`, keeping the raw body when
/// it is not the usual error JSON.
pub(crate) async fn map_response_error(response: reqwest::Response) -> GeminiError {
    let status = response.status();
    match response.text().await {
        Ok(body_text) => {
            let detail = match serde_json::from_str::<GeminiErrorResponse>(&body_text) {
                Ok(parsed) => Some(parsed.error),
                Err(e) => {
                    warn!(%status, error = %e, "Failed to parse Gemini error response JSON, keeping raw body");
                    None
                }
            };
            GeminiError::ApiError { status, detail, body_text }
        }
        Err(e) => {
            warn!(%status, error = %e, "Failed to read Gemini error response body");
            GeminiError::Network(e)
        }
    }
}

impl From<GeminiError> for ChatError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::Network(source) => ChatError::Network(Box::new(source)),
            GeminiError::RequestSerialization(source) => {
                ChatError::InvalidRequest(format!("Failed to serialize request: {}", source))
            }
            GeminiError::ResponseParsing { source, .. } => ChatError::Parsing(Box::new(source)),
            GeminiError::ApiError { status, detail, body_text } => {
                let message = detail
                    .map(|d| format!("{} (Status: {}, Code: {})", d.message, d.status, d.code))
                    .unwrap_or(body_text);
                match status {
                    StatusCode::BAD_REQUEST => ChatError::InvalidRequest(message),
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ChatError::Authentication(message),
                    StatusCode::NOT_FOUND => ChatError::ModelNotFound(message),
                    StatusCode::TOO_MANY_REQUESTS => ChatError::RateLimited,
                    _ => ChatError::Api {
                        status: Some(status.as_u16()),
                        message,
                        source: None,
                    },
                }
            }
            GeminiError::InvalidConfiguration(msg) => ChatError::Configuration(msg),
            GeminiError::InvalidInput(msg) => ChatError::InvalidRequest(msg),
            GeminiError::Blocked(msg) => ChatError::ContentModerated(msg),
        }
    }
}
