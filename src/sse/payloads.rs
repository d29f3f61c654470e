//! SSE payload deserialization structs
//!
//! Internal structs used to pull typed fields out of a frame's JSON payload.

use serde::Deserialize;

/// Payload of `token`, `search` and `urls` frames.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ContentPayload {
    pub content: String,
}

/// Payload of `error` frames.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(default)]
    pub error: Option<String>,
}
