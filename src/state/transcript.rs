//! Conversation transcript
//!
//! An append-only arena of messages. Entries are addressed by a stable
//! [`MessageId`] (their insertion index), so the reducer can keep a handle
//! to the assistant message it is building without holding a reference.

use serde::{Deserialize, Serialize};

use crate::models::{AssistantMessage, Message};

/// Stable handle to one transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(usize);

/// Ordered, append-only list of messages
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its handle
    pub fn push(&mut self, message: Message) -> MessageId {
        self.messages.push(message);
        MessageId(self.messages.len() - 1)
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.get(id.0)
    }

    /// The assistant message behind `id`, if `id` names one
    pub fn assistant(&self, id: MessageId) -> Option<&AssistantMessage> {
        self.get(id).and_then(Message::as_assistant)
    }

    pub(crate) fn assistant_mut(&mut self, id: MessageId) -> Option<&mut AssistantMessage> {
        self.messages.get_mut(id.0).and_then(Message::as_assistant_mut)
    }

    /// Read-only view in display order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Handle of the most recently appended assistant message
    pub fn last_assistant_id(&self) -> Option<MessageId> {
        self.messages
            .iter()
            .rposition(|m| m.as_assistant().is_some())
            .map(MessageId)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
