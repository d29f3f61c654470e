use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a side event shown on an assistant message's timeline
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SideEventKind {
    /// A web search query was issued
    Search,
    /// A search result (or the results header) was retrieved
    Urls,
}

impl SideEventKind {
    /// Timeline label for display
    pub fn label(self) -> &'static str {
        match self {
            SideEventKind::Search => "Web Search",
            SideEventKind::Urls => "Web Result",
        }
    }
}

/// A non-text event observed while an assistant message was being built
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SideEvent {
    pub kind: SideEventKind,
    pub content: String,
    /// Wall-clock time the client applied the event
    pub observed_at: DateTime<Utc>,
}

impl SideEvent {
    pub fn new(kind: SideEventKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            observed_at: Utc::now(),
        }
    }

    /// Same kind and content, ignoring when it was observed.
    pub fn same_as(&self, kind: SideEventKind, content: &str) -> bool {
        self.kind == kind && self.content == content
    }
}

/// The assistant's reply, built incrementally from streamed tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantMessage {
    /// Streamed fragments in arrival order
    tokens: Vec<String>,
    /// Concatenation of `tokens`
    content: String,
    /// Search/result events in arrival order
    events: Vec<SideEvent>,
    pub created_at: DateTime<Utc>,
}

impl AssistantMessage {
    /// Empty placeholder, shown before the first token arrives
    pub fn placeholder() -> Self {
        Self {
            tokens: Vec::new(),
            content: String::new(),
            events: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Append a token unless it repeats the immediately preceding one.
    ///
    /// Returns whether the token was appended.
    pub fn push_token(&mut self, token: &str) -> bool {
        if self.tokens.last().is_some_and(|last| last == token) {
            return false;
        }
        self.tokens.push(token.to_string());
        self.content.push_str(token);
        true
    }

    /// Append a side event unless it repeats the immediately preceding one.
    ///
    /// Returns the appended event, or `None` when it was suppressed.
    pub fn push_side_event(&mut self, kind: SideEventKind, content: &str) -> Option<&SideEvent> {
        if self
            .events
            .last()
            .is_some_and(|last| last.same_as(kind, content))
        {
            return None;
        }
        self.events.push(SideEvent::new(kind, content));
        self.events.last()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Visible text: always the concatenation of the token list
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn events(&self) -> &[SideEvent] {
        &self.events
    }
}

/// One transcript entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    User {
        text: String,
        created_at: DateTime<Utc>,
    },
    Assistant(AssistantMessage),
    Error {
        text: String,
        created_at: DateTime<Utc>,
    },
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Message::User {
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Message::Error {
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    /// Text to display or copy for this entry
    pub fn text(&self) -> &str {
        match self {
            Message::User { text, .. } | Message::Error { text, .. } => text,
            Message::Assistant(assistant) => assistant.content(),
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Message::User { created_at, .. } | Message::Error { created_at, .. } => *created_at,
            Message::Assistant(assistant) => assistant.created_at,
        }
    }

    pub fn as_assistant(&self) -> Option<&AssistantMessage> {
        match self {
            Message::Assistant(assistant) => Some(assistant),
            _ => None,
        }
    }

    pub fn as_assistant_mut(&mut self) -> Option<&mut AssistantMessage> {
        match self {
            Message::Assistant(assistant) => Some(assistant),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Message::Error { .. })
    }
}
