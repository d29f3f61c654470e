//! Stream reduction and the per-turn read loop
//!
//! - `reducer` - applies decoded events to the transcript (dedup, termination)
//! - `driver` - drives transport chunks through framing, decoding and the reducer

pub mod driver;
pub mod reducer;

pub use driver::{
    drive_stream, DriveOptions, SessionUpdate, StreamDriver, StreamOutcome, CONNECTION_ERROR_TEXT,
};
pub use reducer::{Reduction, StreamReducer, Termination, TranscriptChange};
