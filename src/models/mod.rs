//! Data model for the research chat: transcript messages, side events and
//! the request/response shapes of the research server.

mod message;
mod request;

pub use message::{AssistantMessage, Message, SideEvent, SideEventKind};
pub use request::{Endpoint, HealthStatus, RagFiles, RagMessage, StreamRequest, ThreadId};
