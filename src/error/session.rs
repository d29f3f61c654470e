//! Errors raised when starting a conversation turn.

use thiserror::Error;

/// Reasons a new turn cannot be started on a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The query was empty after trimming whitespace.
    #[error("query is empty")]
    EmptyQuery,

    /// A stream is still in flight for this session.
    #[error("a stream is already in progress for thread {thread_id}")]
    StreamInProgress { thread_id: u64 },
}
