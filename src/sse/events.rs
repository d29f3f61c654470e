//! SSE event types and definitions
//!
//! Contains the line classification, the decoded (name, payload) frame and
//! the typed [`StreamEvent`] the reducer consumes.

use serde::{Deserialize, Serialize};

use crate::sse::payloads::{ContentPayload, ErrorPayload};

/// Represents one line of a frame
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Event name declaration (`event: token`)
    Event(String),
    /// Raw JSON payload text (`data: {"content":"hi"}`)
    Data(String),
    /// Any other line; ignored by the decoder
    Other,
}

/// A frame with both an event name and a successfully parsed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    pub event: String,
    pub payload: serde_json::Value,
}

/// Typed events from the research stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// One fragment of assistant text
    Token { content: String },
    /// A search query issued upstream
    Search { content: String },
    /// A retrieved result line (header or `n. title\n   url`)
    Urls { content: String },
    /// Stream completed successfully
    Done,
    /// Error reported by the backend
    Error { message: String },
    /// Anything the reducer does not act on (`user`, `start`, future names,
    /// or a known name whose payload lacks the expected field)
    Unknown { name: String },
}

impl StreamEvent {
    /// Type a decoded frame. Never fails: unusable frames become `Unknown`.
    pub fn from_frame(frame: DecodedFrame) -> Self {
        let DecodedFrame { event, payload } = frame;

        match event.as_str() {
            "token" | "search" | "urls" => {
                match serde_json::from_value::<ContentPayload>(payload) {
                    Ok(ContentPayload { content }) => match event.as_str() {
                        "token" => StreamEvent::Token { content },
                        "search" => StreamEvent::Search { content },
                        _ => StreamEvent::Urls { content },
                    },
                    Err(e) => {
                        tracing::debug!("Dropping {} frame without string content: {}", event, e);
                        StreamEvent::Unknown { name: event }
                    }
                }
            }
            "done" => StreamEvent::Done,
            "error" => {
                let message = serde_json::from_value::<ErrorPayload>(payload)
                    .ok()
                    .and_then(|p| p.error)
                    .unwrap_or_else(|| "Unknown error".to_string());
                StreamEvent::Error { message }
            }
            _ => StreamEvent::Unknown { name: event },
        }
    }

    /// Get the wire name of this event
    pub fn event_type_name(&self) -> &str {
        match self {
            StreamEvent::Token { .. } => "token",
            StreamEvent::Search { .. } => "search",
            StreamEvent::Urls { .. } => "urls",
            StreamEvent::Done => "done",
            StreamEvent::Error { .. } => "error",
            StreamEvent::Unknown { name } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(event: &str, payload: serde_json::Value) -> DecodedFrame {
        DecodedFrame {
            event: event.to_string(),
            payload,
        }
    }

    #[test]
    fn test_from_frame_content_events() {
        assert_eq!(
            StreamEvent::from_frame(frame("token", json!({"content": "Hi"}))),
            StreamEvent::Token {
                content: "Hi".to_string()
            }
        );
        assert_eq!(
            StreamEvent::from_frame(frame("search", json!({"content": "🔎 Searching: rust"}))),
            StreamEvent::Search {
                content: "🔎 Searching: rust".to_string()
            }
        );
        assert_eq!(
            StreamEvent::from_frame(frame("urls", json!({"content": "🌐 Top Search Results:"}))),
            StreamEvent::Urls {
                content: "🌐 Top Search Results:".to_string()
            }
        );
    }

    #[test]
    fn test_from_frame_done_ignores_payload() {
        assert_eq!(
            StreamEvent::from_frame(frame("done", json!({"content": "[DONE]"}))),
            StreamEvent::Done
        );
        assert_eq!(StreamEvent::from_frame(frame("done", json!({}))), StreamEvent::Done);
    }

    #[test]
    fn test_from_frame_error() {
        assert_eq!(
            StreamEvent::from_frame(frame("error", json!({"error": "model not loaded"}))),
            StreamEvent::Error {
                message: "model not loaded".to_string()
            }
        );
        assert_eq!(
            StreamEvent::from_frame(frame("error", json!({}))),
            StreamEvent::Error {
                message: "Unknown error".to_string()
            }
        );
    }

    #[test]
    fn test_from_frame_server_preamble_is_unknown() {
        assert_eq!(
            StreamEvent::from_frame(frame("user", json!({"content": "hello"}))),
            StreamEvent::Unknown {
                name: "user".to_string()
            }
        );
        assert_eq!(
            StreamEvent::from_frame(frame("start", json!({"content": "Assistant:"}))),
            StreamEvent::Unknown {
                name: "start".to_string()
            }
        );
    }

    #[test]
    fn test_from_frame_token_without_string_content() {
        let event = StreamEvent::from_frame(frame("token", json!({"content": 7})));
        assert_eq!(event.event_type_name(), "token");
        assert!(matches!(event, StreamEvent::Unknown { .. }));
    }
}
