use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Correlation id binding the turns of one session to one upstream thread.
///
/// Opaque to the client; generated once per session and reused for every
/// follow-up query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(u64);

impl ThreadId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Fresh id from the current wall-clock time in milliseconds
    pub fn generate() -> Self {
        Self(Utc::now().timestamp_millis().max(0) as u64)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which agent on the server answers the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// Web research agent (`/research/stream`)
    #[default]
    Research,
    /// Retrieval over uploaded documents (`/rag/stream`)
    Rag,
}

impl Endpoint {
    /// Path of the streaming route
    pub fn stream_path(self) -> &'static str {
        match self {
            Endpoint::Research => "/research/stream",
            Endpoint::Rag => "/rag/stream",
        }
    }
}

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "research" => Ok(Endpoint::Research),
            "rag" => Ok(Endpoint::Rag),
            other => Err(format!("unknown endpoint '{}', expected research or rag", other)),
        }
    }
}

/// Parameters of one streamed query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamRequest {
    pub user_input: String,
    pub thread_id: ThreadId,
}

impl StreamRequest {
    pub fn new(user_input: impl Into<String>, thread_id: ThreadId) -> Self {
        Self {
            user_input: user_input.into(),
            thread_id,
        }
    }

    /// Query string for the stream route, with the input percent-encoded
    pub fn query_string(&self) -> String {
        format!(
            "user_input={}&thread_id={}",
            urlencoding::encode(&self.user_input),
            self.thread_id
        )
    }
}

/// Body of `GET /rag/files/`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RagFiles {
    #[serde(default)]
    pub files: Vec<String>,
}

/// Body of the RAG upload and delete responses
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RagMessage {
    pub message: String,
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
