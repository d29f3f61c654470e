//! Stream driver
//!
//! Runs the read loop for one turn: transport chunks go through the frame
//! splitter and decoder into the reducer until a terminal event arrives or
//! the transport ends. Every exit path leaves the session idle.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

use crate::client::ResearchClient;
use crate::config::ClientConfig;
use crate::error::{SessionError, StreamError};
use crate::sse::{decode_frame, FrameSplitter, StreamEvent};
use crate::state::{ChatSession, MessageId};
use crate::stream::reducer::{Reduction, StreamReducer, Termination, TranscriptChange};
use crate::traits::{HttpClient, HttpError};

/// Transcript text appended when the transport fails
pub const CONNECTION_ERROR_TEXT: &str = "Connection error. Please try again.";

/// How a turn's stream ended
#[derive(Debug, Clone, PartialEq)]
pub enum StreamOutcome {
    /// `done` received
    Completed,
    /// `error` received; the backend's message
    UpstreamError(String),
    /// Request, read, idle timeout or framing failure
    TransportFailed(StreamError),
    /// Transport closed without `done` or `error`
    Truncated,
}

impl StreamOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, StreamOutcome::Completed)
    }
}

/// Notifications for a renderer following the stream
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    Change(TranscriptChange),
    ErrorAppended { message: MessageId, text: String },
    Finished(StreamOutcome),
}

/// Limits applied by the read loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriveOptions {
    pub idle_timeout: Option<Duration>,
    pub max_frame_bytes: Option<usize>,
}

impl From<&ClientConfig> for DriveOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            idle_timeout: config.idle_timeout,
            max_frame_bytes: config.max_frame_bytes,
        }
    }
}

/// Runs streamed turns against the research server.
pub struct StreamDriver<C: HttpClient> {
    client: ResearchClient<C>,
    options: DriveOptions,
}

impl<C: HttpClient> StreamDriver<C> {
    pub fn new(client: ResearchClient<C>, options: DriveOptions) -> Self {
        Self { client, options }
    }

    /// Client for the non-streaming endpoints
    pub fn client(&self) -> &ResearchClient<C> {
        &self.client
    }

    /// Submit `query` on `session` and stream the answer into its transcript.
    ///
    /// Fails only when the turn cannot start (empty query, or a stream is
    /// already in progress). Every stream failure is reported through the
    /// outcome and a transcript entry instead.
    pub async fn run_turn(
        &self,
        session: &mut ChatSession,
        query: &str,
        observer: Option<&UnboundedSender<SessionUpdate>>,
    ) -> Result<StreamOutcome, SessionError> {
        let turn = session.begin_turn(query)?;
        let reducer = StreamReducer::new(turn.assistant);

        let outcome = match self.client.stream(&turn.request).await {
            Ok(chunks) => drive_stream(chunks, session, reducer, self.options, observer).await,
            Err(err) => fail(session, observer, StreamError::from(err)),
        };

        session.finish_turn();
        tracing::info!(thread_id = %session.thread_id(), ?outcome, "Turn finished");
        notify(observer, SessionUpdate::Finished(outcome.clone()));

        Ok(outcome)
    }
}

/// Read `chunks` until the reducer reaches a terminal state, the transport
/// ends, or the transport fails.
///
/// Frames are applied strictly in arrival order. Data after a terminal
/// frame, in the same chunk or later ones, is never applied. Does not
/// touch the session's in-progress flag.
pub async fn drive_stream<S>(
    chunks: S,
    session: &mut ChatSession,
    mut reducer: StreamReducer,
    options: DriveOptions,
    observer: Option<&UnboundedSender<SessionUpdate>>,
) -> StreamOutcome
where
    S: Stream<Item = Result<Bytes, HttpError>>,
{
    tokio::pin!(chunks);
    let mut splitter = FrameSplitter::with_max_frame_bytes(options.max_frame_bytes);

    loop {
        let next = match options.idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, chunks.next()).await {
                Ok(next) => next,
                Err(_) => {
                    let err = StreamError::Timeout {
                        duration_secs: limit.as_secs(),
                    };
                    return fail(session, observer, err);
                }
            },
            None => chunks.next().await,
        };

        let chunk = match next {
            Some(Ok(chunk)) => chunk,
            Some(Err(err)) => {
                let err = StreamError::ConnectionLost {
                    message: err.to_string(),
                };
                return fail(session, observer, err);
            }
            None => {
                if !splitter.remainder().is_empty() {
                    tracing::debug!(
                        "Discarding {} bytes of unterminated frame",
                        splitter.remainder().len()
                    );
                }
                tracing::warn!("Stream ended without done or error");
                return StreamOutcome::Truncated;
            }
        };

        splitter.push(&chunk);

        loop {
            let raw = match splitter.next_frame() {
                Ok(Some(raw)) => raw,
                Ok(None) => break,
                Err(err) => return fail(session, observer, err),
            };
            let Some(frame) = decode_frame(&raw) else {
                tracing::debug!("Dropping frame without event name or payload");
                continue;
            };

            let event = StreamEvent::from_frame(frame);
            match reducer.apply(session.transcript_mut(), event) {
                Reduction::Updated(change) => notify(observer, SessionUpdate::Change(change)),
                Reduction::Suppressed | Reduction::Ignored => {}
                Reduction::Terminal(Termination::Done) => return StreamOutcome::Completed,
                Reduction::Terminal(Termination::UpstreamError(id)) => {
                    let text = session
                        .transcript()
                        .get(id)
                        .map(|m| m.text().to_string())
                        .unwrap_or_default();
                    tracing::warn!("Backend reported error: {}", text);
                    notify(
                        observer,
                        SessionUpdate::ErrorAppended {
                            message: id,
                            text: text.clone(),
                        },
                    );
                    return StreamOutcome::UpstreamError(text);
                }
            }
        }

        if let Err(err) = splitter.check_limit() {
            return fail(session, observer, err);
        }
    }
}

fn fail(
    session: &mut ChatSession,
    observer: Option<&UnboundedSender<SessionUpdate>>,
    err: StreamError,
) -> StreamOutcome {
    tracing::warn!(code = err.error_code(), "Stream failed: {}", err);
    let id = session.push_error(CONNECTION_ERROR_TEXT);
    notify(
        observer,
        SessionUpdate::ErrorAppended {
            message: id,
            text: CONNECTION_ERROR_TEXT.to_string(),
        },
    );
    StreamOutcome::TransportFailed(err)
}

fn notify(observer: Option<&UnboundedSender<SessionUpdate>>, update: SessionUpdate) {
    if let Some(tx) = observer {
        // receiver gone means nobody is rendering; the transcript still updates
        let _ = tx.send(update);
    }
}
