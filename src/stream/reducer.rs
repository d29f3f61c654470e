//! Stream reducer
//!
//! Applies decoded stream events to the transcript. The reducer is bound to
//! one assistant message for the lifetime of a turn and stops acting once a
//! terminal event (`done` or `error`) has been applied.

use crate::models::{Message, SideEvent, SideEventKind};
use crate::sse::StreamEvent;
use crate::state::{MessageId, Transcript};

/// A state change an observer can render incrementally
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptChange {
    /// A token was appended to the assistant message
    Token { message: MessageId, token: String },
    /// A side event was appended to the assistant message
    SideEvent { message: MessageId, event: SideEvent },
}

/// How a stream ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// `done` frame
    Done,
    /// `error` frame; the error entry that was appended
    UpstreamError(MessageId),
}

/// Result of applying one event
#[derive(Debug, Clone, PartialEq)]
pub enum Reduction {
    Updated(TranscriptChange),
    /// Adjacent duplicate of the previous token or side event
    Suppressed,
    /// Unknown event, missing active message, or applied after termination
    Ignored,
    Terminal(Termination),
}

/// Reducer for one streaming turn
#[derive(Debug, Clone)]
pub struct StreamReducer {
    /// Assistant message receiving tokens; cleared on termination
    active: Option<MessageId>,
    termination: Option<Termination>,
}

impl StreamReducer {
    pub fn new(active: MessageId) -> Self {
        Self {
            active: Some(active),
            termination: None,
        }
    }

    /// The assistant message being built, while the stream is live
    pub fn active(&self) -> Option<MessageId> {
        self.active
    }

    pub fn is_terminal(&self) -> bool {
        self.termination.is_some()
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Apply one event to the transcript.
    pub fn apply(&mut self, transcript: &mut Transcript, event: StreamEvent) -> Reduction {
        if self.is_terminal() {
            tracing::debug!(
                "Ignoring {} event after stream termination",
                event.event_type_name()
            );
            return Reduction::Ignored;
        }

        match event {
            StreamEvent::Token { content } => self.apply_token(transcript, content),
            StreamEvent::Search { content } => {
                self.apply_side_event(transcript, SideEventKind::Search, content)
            }
            StreamEvent::Urls { content } => {
                self.apply_side_event(transcript, SideEventKind::Urls, content)
            }
            StreamEvent::Done => self.terminate(Termination::Done),
            StreamEvent::Error { message } => {
                let id = transcript.push(Message::error(message));
                self.terminate(Termination::UpstreamError(id))
            }
            StreamEvent::Unknown { name } => {
                tracing::debug!("Ignoring unrecognized event '{}'", name);
                Reduction::Ignored
            }
        }
    }

    fn apply_token(&mut self, transcript: &mut Transcript, token: String) -> Reduction {
        let Some(id) = self.active else {
            return Reduction::Ignored;
        };
        let Some(assistant) = transcript.assistant_mut(id) else {
            tracing::warn!("Active message {:?} is not an assistant message", id);
            return Reduction::Ignored;
        };

        if assistant.push_token(&token) {
            Reduction::Updated(TranscriptChange::Token { message: id, token })
        } else {
            tracing::debug!("Suppressed duplicate token {:?}", token);
            Reduction::Suppressed
        }
    }

    fn apply_side_event(
        &mut self,
        transcript: &mut Transcript,
        kind: SideEventKind,
        content: String,
    ) -> Reduction {
        let Some(id) = self.active else {
            return Reduction::Ignored;
        };
        let Some(assistant) = transcript.assistant_mut(id) else {
            tracing::warn!("Active message {:?} is not an assistant message", id);
            return Reduction::Ignored;
        };

        match assistant.push_side_event(kind, &content) {
            Some(event) => Reduction::Updated(TranscriptChange::SideEvent {
                message: id,
                event: event.clone(),
            }),
            None => {
                tracing::debug!("Suppressed duplicate {:?} event", kind);
                Reduction::Suppressed
            }
        }
    }

    fn terminate(&mut self, termination: Termination) -> Reduction {
        self.active = None;
        self.termination = Some(termination);
        Reduction::Terminal(termination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssistantMessage;

    fn setup() -> (Transcript, StreamReducer) {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("q"));
        let id = transcript.push(Message::Assistant(AssistantMessage::placeholder()));
        (transcript, StreamReducer::new(id))
    }

    fn token(s: &str) -> StreamEvent {
        StreamEvent::Token {
            content: s.to_string(),
        }
    }

    fn search(s: &str) -> StreamEvent {
        StreamEvent::Search {
            content: s.to_string(),
        }
    }

    #[test]
    fn test_tokens_with_adjacent_duplicate() {
        let (mut transcript, mut reducer) = setup();
        let id = reducer.active().unwrap();

        assert!(matches!(
            reducer.apply(&mut transcript, token("Hi")),
            Reduction::Updated(TranscriptChange::Token { .. })
        ));
        reducer.apply(&mut transcript, token(" there"));
        assert_eq!(
            reducer.apply(&mut transcript, token(" there")),
            Reduction::Suppressed
        );
        assert_eq!(
            reducer.apply(&mut transcript, StreamEvent::Done),
            Reduction::Terminal(Termination::Done)
        );

        let assistant = transcript.assistant(id).unwrap();
        assert_eq!(assistant.content(), "Hi there");
        assert_eq!(assistant.tokens().concat(), assistant.content());
        assert!(reducer.is_terminal());
        assert!(reducer.active().is_none());
    }

    #[test]
    fn test_identical_search_frames_yield_one_event() {
        let (mut transcript, mut reducer) = setup();
        let id = reducer.active().unwrap();

        reducer.apply(&mut transcript, search("weather today"));
        assert_eq!(
            reducer.apply(&mut transcript, search("weather today")),
            Reduction::Suppressed
        );

        let events = transcript.assistant(id).unwrap().events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, SideEventKind::Search);
        assert_eq!(events[0].content, "weather today");
    }

    #[test]
    fn test_urls_after_search_with_same_content_is_kept() {
        let (mut transcript, mut reducer) = setup();
        let id = reducer.active().unwrap();

        reducer.apply(&mut transcript, search("x"));
        reducer.apply(
            &mut transcript,
            StreamEvent::Urls {
                content: "x".to_string(),
            },
        );
        assert_eq!(transcript.assistant(id).unwrap().events().len(), 2);
    }

    #[test]
    fn test_side_events_do_not_reset_token_dedup() {
        let (mut transcript, mut reducer) = setup();
        let id = reducer.active().unwrap();

        reducer.apply(&mut transcript, token("a"));
        reducer.apply(&mut transcript, search("q"));
        assert_eq!(reducer.apply(&mut transcript, token("a")), Reduction::Suppressed);
        assert_eq!(transcript.assistant(id).unwrap().content(), "a");
    }

    #[test]
    fn test_error_appends_separate_entry_and_terminates() {
        let (mut transcript, mut reducer) = setup();
        let id = reducer.active().unwrap();
        reducer.apply(&mut transcript, token("partial"));

        let reduction = reducer.apply(
            &mut transcript,
            StreamEvent::Error {
                message: "model crashed".to_string(),
            },
        );

        let Reduction::Terminal(Termination::UpstreamError(error_id)) = reduction else {
            panic!("expected upstream error termination, got {:?}", reduction);
        };
        assert_eq!(transcript.len(), 3);
        assert_eq!(
            transcript.get(error_id),
            Some(&Message::Error {
                text: "model crashed".to_string(),
                created_at: transcript.get(error_id).unwrap().created_at(),
            })
        );
        assert_eq!(transcript.assistant(id).unwrap().content(), "partial");
    }

    #[test]
    fn test_events_after_termination_are_ignored() {
        let (mut transcript, mut reducer) = setup();
        let id = reducer.active().unwrap();

        reducer.apply(&mut transcript, StreamEvent::Done);
        assert_eq!(reducer.apply(&mut transcript, token("late")), Reduction::Ignored);
        assert_eq!(
            reducer.apply(
                &mut transcript,
                StreamEvent::Error {
                    message: "late".to_string()
                }
            ),
            Reduction::Ignored
        );
        assert_eq!(reducer.termination(), Some(Termination::Done));
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.assistant(id).unwrap().content(), "");
    }

    #[test]
    fn test_unknown_event_ignored() {
        let (mut transcript, mut reducer) = setup();
        assert_eq!(
            reducer.apply(
                &mut transcript,
                StreamEvent::Unknown {
                    name: "start".to_string()
                }
            ),
            Reduction::Ignored
        );
        assert!(!reducer.is_terminal());
    }

    #[test]
    fn test_handle_to_non_assistant_is_ignored() {
        let mut transcript = Transcript::new();
        let user = transcript.push(Message::user("q"));
        let mut reducer = StreamReducer::new(user);
        assert_eq!(reducer.apply(&mut transcript, token("x")), Reduction::Ignored);
    }
}
