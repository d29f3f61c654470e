//! Shared test fixtures for integration tests.
//!
//! Provides frame builders, a mock-backed stream driver, and a
//! timestamp-free view of a transcript for comparing runs.

#![allow(dead_code)]

pub use localmind::adapters::mock::{MockHttpClient, MockResponse};

use bytes::Bytes;
use localmind::client::ResearchClient;
use localmind::config::ClientConfig;
use localmind::models::{Message, ThreadId};
use localmind::state::{ChatSession, Transcript};
use localmind::stream::{DriveOptions, StreamDriver};

pub const BASE_URL: &str = "http://research.test";

/// One wire frame, including its terminating blank line.
pub fn frame(event: &str, data: &str) -> String {
    format!("event: {}\ndata: {}\n\n", event, data)
}

pub fn token(content: &str) -> String {
    frame("token", &serde_json::json!({ "content": content }).to_string())
}

pub fn search(content: &str) -> String {
    frame("search", &serde_json::json!({ "content": content }).to_string())
}

pub fn urls(content: &str) -> String {
    frame("urls", &serde_json::json!({ "content": content }).to_string())
}

pub fn done() -> String {
    frame("done", r#"{"content": "[DONE]"}"#)
}

pub fn upstream_error(message: &str) -> String {
    frame("error", &serde_json::json!({ "error": message }).to_string())
}

/// The preamble the server sends before any token.
pub fn preamble(query: &str) -> String {
    format!(
        "{}{}",
        frame("user", &serde_json::json!({ "content": query }).to_string()),
        frame("start", r#"{"content": "Assistant:"}"#)
    )
}

/// Session with a fixed thread id, so request URLs are predictable.
pub fn test_session() -> ChatSession {
    ChatSession::with_thread_id(ThreadId::new(1234))
}

pub fn test_config() -> ClientConfig {
    ClientConfig::default().with_base_url(BASE_URL)
}

/// Driver over `mock` using the test config and `options`.
pub fn mock_driver(mock: &MockHttpClient, options: DriveOptions) -> StreamDriver<MockHttpClient> {
    StreamDriver::new(ResearchClient::with_http(&test_config(), mock.clone()), options)
}

/// Mock that answers every stream request with `body` split into `chunks`.
pub fn mock_stream(chunks: Vec<Vec<u8>>) -> MockHttpClient {
    let mock = MockHttpClient::new();
    mock.set_default_response(MockResponse::Stream(
        chunks.into_iter().map(Bytes::from).collect(),
    ));
    mock
}

/// Transcript with timestamps stripped: kind, text, tokens and side events.
pub fn snapshot(transcript: &Transcript) -> Vec<String> {
    transcript
        .messages()
        .iter()
        .map(|message| match message {
            Message::User { text, .. } => format!("user:{}", text),
            Message::Error { text, .. } => format!("error:{}", text),
            Message::Assistant(assistant) => {
                let events: Vec<String> = assistant
                    .events()
                    .iter()
                    .map(|e| format!("{:?}={}", e.kind, e.content))
                    .collect();
                format!(
                    "assistant:{:?}|{}|{:?}",
                    assistant.tokens(),
                    assistant.content(),
                    events
                )
            }
        })
        .collect()
}
