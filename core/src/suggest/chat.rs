use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::chat::{ChatApi, ChatOptions, Message};
use crate::path::{slugify, FolderPath};
use crate::tags::TagSet;

use super::{SuggestConfig, SuggestError, Suggester, Suggestion};

/// Notes longer than this are cut before being sent to the model.
const MAX_NOTE_CHARS: usize = 12_000;

const SYSTEM_PROMPT: &str = "You file Markdown notes into a folder hierarchy. \
Reply with a single JSON object and nothing else, using exactly these fields: \
\"tags\" (an array of 1 to 5 short lowercase tags), \
\"folder\" (a slash separated path of at most 3 lowercase dash-separated segments; \
prefer one of the existing folders when it fits) and \
\"file_name\" (a short lowercase dash-separated file name without extension).";

/// Asks a chat model for a [`Suggestion`], retrying unusable answers.
pub struct ChatSuggester<C> {
    chat: C,
    config: SuggestConfig,
}

#[derive(Deserialize, Debug)]
struct RawSuggestion {
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default, alias = "folderPath", alias = "path")]
    folder: String,
    #[serde(alias = "fileName", alias = "name")]
    file_name: String,
}

impl<C: ChatApi> ChatSuggester<C> {
    pub fn new(chat: C, config: SuggestConfig) -> Self {
        ChatSuggester { chat, config }
    }

    fn messages(note_text: &str, existing_folders: &[FolderPath]) -> Vec<Message> {
        let folders = if existing_folders.is_empty() {
            "(none yet)".to_string()
        } else {
            existing_folders.iter()
                .map(|f| format!("- {}", f))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let note = match note_text.char_indices().nth(MAX_NOTE_CHARS) {
            Some((cut, _)) => &note_text[..cut],
            None => note_text,
        };
        vec![
            Message::system(SYSTEM_PROMPT),
            Message::user(format!("Existing folders:\n{}\n\nNote:\n{}", folders, note)),
        ]
    }

    async fn attempt(&self, messages: &[Message]) -> Result<Suggestion, SuggestError> {
        let options = ChatOptions {
            model_id: self.config.model.clone(),
            temperature: self.config.temperature,
            response_mime_type: Some("application/json".to_string()),
            ..Default::default()
        };
        let response = self.chat.generate(messages, &options).await?;
        parse_response(&response.text)
    }
}

#[async_trait]
impl<C: ChatApi> Suggester for ChatSuggester<C> {
    #[instrument(skip_all, fields(folders = existing_folders.len()))]
    async fn suggest(&self, note_text: &str, existing_folders: &[FolderPath]) -> Result<Suggestion, SuggestError> {
        let messages = Self::messages(note_text, existing_folders);
        let attempts = self.config.max_attempts.max(1);

        let mut last = None;
        for attempt in 1..=attempts {
            match self.attempt(&messages).await {
                Ok(suggestion) => {
                    debug!(attempt, ?suggestion, "Received suggestion");
                    return Ok(suggestion);
                }
                Err(e) => {
                    warn!(attempt, attempts, error = %e, "Suggestion attempt failed");
                    last = Some(e);
                }
            }
        }
        Err(SuggestError::Exhausted {
            attempts,
            last: Box::new(last.unwrap_or(SuggestError::EmptyResponse)),
        })
    }
}

/// Extracts a suggestion from model output, tolerating code fences and chatter around
/// the JSON object.
pub(crate) fn parse_response(text: &str) -> Result<Suggestion, SuggestError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SuggestError::EmptyResponse);
    }
    let json = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => return Err(SuggestError::MalformedResponse("no JSON object found".to_string())),
    };
    let raw: RawSuggestion = serde_json::from_str(json)
        .map_err(|e| SuggestError::MalformedResponse(e.to_string()))?;

    let file_name = slugify(&raw.file_name);
    if file_name.is_empty() {
        return Err(SuggestError::MalformedResponse("file name is empty".to_string()));
    }
    Ok(Suggestion {
        tags: raw.tags.into_iter().collect::<TagSet>(),
        folder: FolderPath::parse(&raw.folder),
        file_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatError, ChatResponse};
    use std::sync::Mutex;

    /// Replays canned replies in order.
    struct Scripted(Mutex<Vec<Result<String, ChatError>>>);

    impl Scripted {
        fn new(mut replies: Vec<Result<String, ChatError>>) -> Self {
            replies.reverse();
            Scripted(Mutex::new(replies))
        }

        fn remaining(&self) -> usize {
            self.0.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatApi for Scripted {
        async fn generate(&self, _: &[Message], _: &ChatOptions) -> Result<ChatResponse, ChatError> {
            let reply = self.0.lock().unwrap().pop().expect("no scripted reply left")?;
            Ok(ChatResponse { text: reply, usage: None, finish_reason: None, model_id: None })
        }
    }

    const GOOD: &str = r#"{"tags": ["Rust", "async"], "folder": "Dev/Rust_Notes", "file_name": "Tokio Tips"}"#;

    #[test]
    fn parses_plain_json() {
        let s = parse_response(GOOD).unwrap();
        assert_eq!(s.tags.to_strings(), ["rust", "async"]);
        assert_eq!(s.folder.to_string(), "dev/rust-notes");
        assert_eq!(s.file_name, "tokio-tips");
    }

    #[test]
    fn parses_fenced_json_with_aliases() {
        let text = "Sure!\n```json\n{\"tags\": [], \"folderPath\": \"a/b\", \"fileName\": \"x\"}\n```";
        let s = parse_response(text).unwrap();
        assert!(s.tags.is_empty());
        assert_eq!(s.folder.to_string(), "a/b");
        assert_eq!(s.file_name, "x");
    }

    #[test]
    fn rejects_unusable_responses() {
        assert!(matches!(parse_response("  "), Err(SuggestError::EmptyResponse)));
        assert!(matches!(parse_response("no json"), Err(SuggestError::MalformedResponse(_))));
        assert!(matches!(parse_response(r#"{"tags": []}"#), Err(SuggestError::MalformedResponse(_))));
        assert!(matches!(parse_response(r#"{"file_name": "???"}"#), Err(SuggestError::MalformedResponse(_))));
    }

    #[test]
    fn messages_list_folders_and_truncate_note() {
        let long = "é".repeat(MAX_NOTE_CHARS + 10);
        let messages = ChatSuggester::<Scripted>::messages(&long, &[FolderPath::parse("a/b")]);
        assert_eq!(messages.len(), 2);
        let user = messages[1].text();
        assert!(user.contains("- a/b"));
        assert_eq!(user.matches('é').count(), MAX_NOTE_CHARS);
    }

    #[tokio::test]
    async fn retries_until_usable() {
        let chat = Scripted::new(vec![
            Err(ChatError::RateLimited),
            Ok("not json".to_string()),
            Ok(GOOD.to_string()),
        ]);
        let suggester = ChatSuggester::new(chat, SuggestConfig::default());
        let s = suggester.suggest("# Note", &[]).await.unwrap();
        assert_eq!(s.file_name, "tokio-tips");
        assert_eq!(suggester.chat.remaining(), 0);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let chat = Scripted::new(vec![
            Ok(String::new()),
            Ok(String::new()),
            Ok(GOOD.to_string()),
        ]);
        let config = SuggestConfig { max_attempts: 2, ..Default::default() };
        let suggester = ChatSuggester::new(chat, config);
        let err = suggester.suggest("# Note", &[]).await.unwrap_err();
        match err {
            SuggestError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 2);
                assert!(matches!(*last, SuggestError::EmptyResponse));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(suggester.chat.remaining(), 1);
    }
}
