use std::sync::Arc;

use async_trait::async_trait;
use notefiler_core::chat::{ChatApi, ChatError, ChatOptions, ChatResponse, FinishReason, Message, UsageInfo};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, trace, warn};

use super::error::{map_response_error, GeminiError};
use super::shared::{GeminiConfig, SharedGeminiClient};

pub const DEFAULT_GEMINI_CHAT_MODEL: &str = "gemini-2.0-flash";

// ============== Request ==============

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerateRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

impl GeminiContent {
    fn text(role: &str, text: &str) -> Self {
        GeminiContent {
            role: role.to_string(),
            parts: vec![GeminiPart { text: text.to_string() }],
        }
    }
}

#[derive(Serialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidate_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    /// "application/json" switches the model to JSON mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

impl From<&ChatOptions> for GeminiGenerationConfig {
    fn from(options: &ChatOptions) -> Self {
        GeminiGenerationConfig {
            temperature: options.temperature,
            candidate_count: Some(1),
            max_output_tokens: options.max_tokens,
            response_mime_type: options.response_mime_type.clone(),
        }
    }
}

// ============== Response ==============
//
// https://ai.google.dev/api/generate-content#v1beta.GenerateContentResponse

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerateResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    usage_metadata: Option<GeminiUsageMetadata>,
    model_version: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<GeminiFinishReason>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum GeminiFinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
    Blocklist,
    ProhibitedContent,
    Spii,
    #[serde(other)]
    Other,
}

impl From<GeminiFinishReason> for FinishReason {
    fn from(reason: GeminiFinishReason) -> Self {
        match reason {
            GeminiFinishReason::Stop => FinishReason::Stop,
            GeminiFinishReason::MaxTokens => FinishReason::Length,
            GeminiFinishReason::Safety
            | GeminiFinishReason::ProhibitedContent
            | GeminiFinishReason::Spii
            | GeminiFinishReason::Blocklist => FinishReason::ContentFilter,
            GeminiFinishReason::Recitation => FinishReason::Other("Recitation".to_string()),
            GeminiFinishReason::Other => FinishReason::Other("Unknown".to_string()),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}

impl From<GeminiUsageMetadata> for UsageInfo {
    fn from(usage: GeminiUsageMetadata) -> Self {
        UsageInfo {
            prompt_tokens: usage.prompt_token_count,
            completion_tokens: usage.candidates_token_count,
            total_tokens: usage.total_token_count,
        }
    }
}

impl GeminiGenerateResponse {
    fn into_chat_response(self, request_model_id: &str) -> Result<ChatResponse, GeminiError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GeminiError::Blocked(format!("prompt blocked: {}", reason)));
        }
        let usage = self.usage_metadata.map(Into::into);
        let model_id = Some(self.model_version.unwrap_or_else(|| request_model_id.to_string()));

        let Some(candidate) = self.candidates.into_iter().next() else {
            warn!("Gemini response contained no candidates");
            return Ok(ChatResponse {
                text: String::new(),
                usage,
                finish_reason: Some(FinishReason::Other("No candidate received".to_string())),
                model_id,
            });
        };

        let finish_reason = candidate.finish_reason.map(FinishReason::from);
        let text = match candidate.content {
            Some(content) if content.role.is_empty() || content.role == "model" => content.parts
                .into_iter()
                .map(|part| part.text)
                .collect::<String>(),
            Some(content) => {
                warn!(role = %content.role, "Unexpected role in Gemini candidate content");
                String::new()
            }
            None => String::new(),
        };
        if text.is_empty() && finish_reason == Some(FinishReason::ContentFilter) {
            return Err(GeminiError::Blocked("response blocked by safety filters".to_string()));
        }

        Ok(ChatResponse { text, usage, finish_reason, model_id })
    }
}

// ============== Client ==============

/// Text-only client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiChatClient {
    shared_client: Arc<SharedGeminiClient>,
    default_model_id: String,
}

impl GeminiChatClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, GeminiError> {
        Self::new_with_options(GeminiConfig::new(api_key)?, None, None)
    }

    pub fn new_with_options(
        config: GeminiConfig,
        default_model_id: Option<String>,
        client_override: Option<Client>,
    ) -> Result<Self, GeminiError> {
        let shared_client = SharedGeminiClient::new(config, client_override)?;
        Ok(Self::new_with_shared_client(Arc::new(shared_client), default_model_id))
    }

    pub(crate) fn new_with_shared_client(
        shared_client: Arc<SharedGeminiClient>,
        default_model_id: Option<String>,
    ) -> Self {
        let default_model_id = default_model_id.unwrap_or_else(|| DEFAULT_GEMINI_CHAT_MODEL.to_string());
        debug!(%default_model_id, "GeminiChatClient created");
        Self { shared_client, default_model_id }
    }

    pub fn default_model_id(&self) -> &str {
        &self.default_model_id
    }

    /// Gemini takes the system prompt separately and calls the assistant "model".
    fn convert_messages(messages: &[Message]) -> Result<(Option<GeminiContent>, Vec<GeminiContent>), GeminiError> {
        let mut system_instruction = None;
        let mut contents = Vec::with_capacity(messages.len());
        for message in messages {
            match message {
                Message::System(text) => {
                    if system_instruction.is_some() {
                        return Err(GeminiError::InvalidInput(
                            "Only one system message is supported by Gemini".to_string(),
                        ));
                    }
                    system_instruction = Some(GeminiContent::text("user", text));
                }
                Message::User(text) => contents.push(GeminiContent::text("user", text)),
                Message::Assistant(text) => contents.push(GeminiContent::text("model", text)),
            }
        }
        if contents.is_empty() {
            return Err(GeminiError::InvalidInput("At least one user message is required".to_string()));
        }
        Ok((system_instruction, contents))
    }

    fn build_request(messages: &[Message], options: &ChatOptions) -> Result<GeminiGenerateRequest, GeminiError> {
        let (system_instruction, contents) = Self::convert_messages(messages)?;
        Ok(GeminiGenerateRequest {
            contents,
            system_instruction,
            generation_config: Some(GeminiGenerationConfig::from(options)),
        })
    }

    async fn generate_inner(&self, messages: &[Message], options: &ChatOptions) -> Result<ChatResponse, GeminiError> {
        let model_id = options.model_id.as_deref().unwrap_or(&self.default_model_id);
        let model_id = model_id.strip_prefix("models/").unwrap_or(model_id);
        let url = self.shared_client.build_url(&format!("models/{}:generateContent", model_id))?;
        debug!(%url, %model_id, "Sending generate request to Gemini");

        let request_body = Self::build_request(messages, options)?;
        let request_json = serde_json::to_string(&request_body).map_err(GeminiError::RequestSerialization)?;
        trace!(body = %request_json, "Gemini request body");

        let response = self.shared_client.http_client()
            .post(url)
            .header("x-goog-api-key", self.shared_client.config().api_key.expose_secret())
            .header("Content-Type", "application/json")
            .body(request_json)
            .send()
            .await?;

        if !response.status().is_success() {
            error!(status = %response.status(), "Gemini generate API returned error status");
            return Err(map_response_error(response).await);
        }

        let raw_body = response.text().await?;
        trace!(body = %raw_body, "Gemini response body");
        let gemini_response: GeminiGenerateResponse = serde_json::from_str(&raw_body)
            .map_err(|e| {
                error!(parse_error = %e, "Failed to parse Gemini generate response JSON");
                GeminiError::ResponseParsing { context: "generate response".to_string(), source: e }
            })?;

        gemini_response.into_chat_response(model_id)
    }
}

#[async_trait]
impl ChatApi for GeminiChatClient {
    #[instrument(skip(self, messages, options), fields(model = options.model_id.as_deref().unwrap_or(&self.default_model_id)))]
    async fn generate(&self, messages: &[Message], options: &ChatOptions) -> Result<ChatResponse, ChatError> {
        self.generate_inner(messages, options).await.map_err(Into::into)
    }
}
