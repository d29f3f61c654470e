//! SSE (Server-Sent Events) stream framing and decoding
//!
//! The research server streams frames of the form:
//! - `event: <name>` - event name line
//! - `data: <json>` - JSON payload line
//! - blank line (`\n\n`) - ends the frame
//!
//! # Module structure
//! - `splitter` - chunk buffering and frame extraction (FrameSplitter)
//! - `parser` - line classification and frame decoding
//! - `events` - StreamEvent and the decoded frame types
//! - `payloads` - internal payload deserialization structs

mod events;
mod parser;
mod payloads;
mod splitter;

pub use events::{DecodedFrame, SseLine, StreamEvent};
pub use parser::{decode_frame, parse_sse_line};
pub use splitter::{FrameSplitter, DEFAULT_MAX_FRAME_BYTES};
