//! Conversation state
//!
//! - [`Transcript`]: append-only message arena addressed by [`MessageId`]
//! - [`ChatSession`]: transcript + thread id + in-progress flag

pub mod session;
pub mod transcript;

pub use session::{ChatSession, TurnStart};
pub use transcript::{MessageId, Transcript};
