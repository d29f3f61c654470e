//! Chat session state
//!
//! A session owns the transcript and the thread id shared by all of its
//! turns. Only one turn may stream at a time; the session is the single
//! writer of its transcript.

use serde::Serialize;

use crate::error::SessionError;
use crate::models::{AssistantMessage, Message, StreamRequest, ThreadId};
use crate::state::transcript::{MessageId, Transcript};

/// What `begin_turn` hands to the stream driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnStart {
    pub request: StreamRequest,
    /// The assistant placeholder the stream will fill
    pub assistant: MessageId,
}

/// One conversation with the research server
#[derive(Debug, Clone, Serialize)]
pub struct ChatSession {
    thread_id: ThreadId,
    transcript: Transcript,
    #[serde(skip)]
    in_progress: bool,
}

impl ChatSession {
    /// New session with a freshly generated thread id
    pub fn new() -> Self {
        Self::with_thread_id(ThreadId::generate())
    }

    pub fn with_thread_id(thread_id: ThreadId) -> Self {
        Self {
            thread_id,
            transcript: Transcript::new(),
            in_progress: false,
        }
    }

    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub(crate) fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    /// Whether a stream is in flight (disable input, show a pending marker)
    pub fn is_streaming(&self) -> bool {
        self.in_progress
    }

    /// Start a turn: append the user message and an empty assistant
    /// placeholder, and mark the session as streaming.
    pub fn begin_turn(&mut self, query: &str) -> Result<TurnStart, SessionError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SessionError::EmptyQuery);
        }
        if self.in_progress {
            return Err(SessionError::StreamInProgress {
                thread_id: self.thread_id.get(),
            });
        }

        self.transcript.push(Message::user(query));
        let assistant = self
            .transcript
            .push(Message::Assistant(AssistantMessage::placeholder()));
        self.in_progress = true;

        tracing::info!(thread_id = %self.thread_id, "Starting turn");

        Ok(TurnStart {
            request: StreamRequest::new(query, self.thread_id),
            assistant,
        })
    }

    /// Append an error entry to the transcript
    pub fn push_error(&mut self, text: impl Into<String>) -> MessageId {
        self.transcript.push(Message::error(text))
    }

    /// Return to idle so the next query can be submitted
    pub fn finish_turn(&mut self) {
        self.in_progress = false;
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
