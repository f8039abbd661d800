//! Live tests against the Gemini API. Run with `--ignored` and `GEMINI_API_KEY` set.

mod common;

use notefiler_core::chat::{ChatApi, ChatError, ChatOptions, Message};
use notefiler_core::path::FolderPath;
use notefiler_core::suggest::{ChatSuggester, SuggestConfig, Suggester};
use notefiler_extensions::gemini::{GeminiChatClient, GeminiConfig};

fn client(test_name: &str) -> Option<GeminiChatClient> {
    common::setup_tracing();
    let key = common::api_key_or_skip("GEMINI_API_KEY", test_name)?;
    Some(GeminiChatClient::new(key).expect("client should build"))
}

#[tokio::test]
#[ignore]
async fn generate_simple_text() {
    let Some(client) = client("generate_simple_text") else { return };
    let messages = [Message::user("What is the capital of France? Answer in one word.")];
    let options = ChatOptions { temperature: Some(0.0), max_tokens: Some(20), ..Default::default() };

    let response = client.generate(&messages, &options).await.unwrap();
    assert!(response.text.to_lowercase().contains("paris"));
    assert!(response.finish_reason.is_some());
    assert!(response.usage.is_some());
}

#[tokio::test]
#[ignore]
async fn suggests_placement_in_json_mode() {
    let Some(client) = client("suggests_placement_in_json_mode") else { return };
    let suggester = ChatSuggester::new(client, SuggestConfig { temperature: Some(0.0), ..Default::default() });
    let folders = [FolderPath::parse("cooking/recipes"), FolderPath::parse("work/meetings")];

    let suggestion = suggester
        .suggest("# Pancakes\n\nFlour, milk, eggs. Whisk and fry in butter.", &folders)
        .await
        .unwrap();
    assert!(!suggestion.file_name.is_empty());
    assert!(suggestion.folder.len() <= 3);
    assert_eq!(suggestion.folder.segments().first().map(String::as_str), Some("cooking"));
}

#[tokio::test]
#[ignore]
async fn invalid_key_is_an_authentication_error() {
    common::setup_tracing();
    let client = GeminiChatClient::new_with_options(GeminiConfig::new("not-a-real-key").unwrap(), None, None).unwrap();
    let result = client.generate(&[Message::user("hi")], &ChatOptions::default()).await;
    assert!(matches!(result, Err(ChatError::Authentication(_)) | Err(ChatError::InvalidRequest(_))));
}
