//! Error types for localmind.
//!
//! - [`StreamError`]: transport failures that end a streaming turn
//! - [`SessionError`]: a turn could not be started
//!
//! Malformed frames are not represented here. They are dropped by the
//! decoder and logged, and the stream keeps going.

mod session;
mod stream;

pub use session::SessionError;
pub use stream::StreamError;
