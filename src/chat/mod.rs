//! Session chat log
//!
//! Bounded per-session message history. Sender display names are denormalized
//! at send time so history stays readable after a participant leaves.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    /// Plain text
    Text,
    /// Anything else the clients define (emoji reactions, attachments, ...)
    #[serde(untagged)]
    Other(String),
}

impl Default for MessageKind {
    fn default() -> Self {
        MessageKind::Text
    }
}

/// One chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Message id
    pub id: Uuid,
    /// Sender participant id
    pub sender_id: String,
    /// Sender display name, captured at send time
    pub sender_name: String,
    /// Message body
    pub body: String,
    /// Message kind
    pub kind: MessageKind,
    /// When the message was sent
    pub at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new message stamped now
    pub fn new(
        sender_id: impl Into<String>,
        sender_name: impl Into<String>,
        body: impl Into<String>,
        kind: MessageKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id: sender_id.into(),
            sender_name: sender_name.into(),
            body: body.into(),
            kind,
            at: Utc::now(),
        }
    }
}

/// Bounded chat history for one session
#[derive(Debug)]
pub struct ChatLog {
    messages: VecDeque<ChatMessage>,
    limit: usize,
}

impl ChatLog {
    /// Create an empty log retaining at most `limit` messages
    pub fn new(limit: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            limit,
        }
    }

    /// Append a message, evicting the oldest beyond the limit
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        while self.messages.len() > self.limit {
            self.messages.pop_front();
        }
    }

    /// The most recent `n` messages, oldest first
    pub fn recent(&self, n: usize) -> Vec<ChatMessage> {
        let skip = self.messages.len().saturating_sub(n);
        self.messages.iter().skip(skip).cloned().collect()
    }

    /// Number of retained messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
