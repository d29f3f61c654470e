//! Streaming-related error types.
//!
//! This module defines errors that occur while reading and framing the
//! research stream. Decode problems inside a single frame are not errors at
//! this level: the decoder drops those frames and the stream continues.
//! Errors the backend reports in an `error` frame are stream content, not
//! transport failures, and never become a `StreamError`.

use std::fmt;

use crate::traits::HttpError;

/// Stream-specific error variants.
///
/// Every variant ends the current turn. The driver reports them to the user
/// as a connection-error transcript entry.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// Stream connection was lost unexpectedly (read failed mid-stream).
    ConnectionLost {
        message: String,
    },

    /// The request could not be issued or the server refused it.
    ServerError {
        status: Option<u16>,
        message: String,
    },

    /// Stream timeout (no data received for the idle window).
    Timeout {
        duration_secs: u64,
    },

    /// A frame grew past the configured cap without a delimiter.
    FrameTooLarge {
        limit: usize,
        buffered: usize,
    },
}

impl StreamError {
    /// Check if this error is likely transient and the query can be resent.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::ConnectionLost { .. } | StreamError::Timeout { .. } => true,
            StreamError::ServerError { status, .. } => {
                status.map_or(true, |code| code >= 500)
            }
            StreamError::FrameTooLarge { .. } => false,
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::ConnectionLost { .. } => "E_STREAM_CONN",
            StreamError::ServerError { .. } => "E_STREAM_SERVER",
            StreamError::Timeout { .. } => "E_STREAM_TIMEOUT",
            StreamError::FrameTooLarge { .. } => "E_STREAM_FRAME",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::ConnectionLost { message } => {
                write!(f, "Stream connection lost: {}", message)
            }
            StreamError::ServerError { status, message } => match status {
                Some(code) => write!(f, "Stream request failed ({}): {}", code, message),
                None => write!(f, "Stream request failed: {}", message),
            },
            StreamError::Timeout { duration_secs } => {
                write!(f, "Stream timeout after {} seconds", duration_secs)
            }
            StreamError::FrameTooLarge { limit, buffered } => write!(
                f,
                "Frame too large: {} bytes buffered, limit is {}",
                buffered, limit
            ),
        }
    }
}

impl std::error::Error for StreamError {}

impl From<HttpError> for StreamError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ServerError { status, message } => StreamError::ServerError {
                status: Some(status),
                message,
            },
            HttpError::ConnectionFailed(message)
            | HttpError::InvalidUrl(message)
            | HttpError::Timeout(message) => StreamError::ServerError {
                status: None,
                message,
            },
            HttpError::Io(message) | HttpError::Other(message) => {
                StreamError::ConnectionLost { message }
            }
            HttpError::Cancelled => StreamError::ConnectionLost {
                message: "request cancelled".to_string(),
            },
        }
    }
}
