//! In-Memory Conversation Log
//!
//! Information Hiding:
//! - Vec storage structure hidden from users
//! - All mutation goes through append/replace_all/clear
//! - Single-owner: callers hold `&mut` for the duration of a turn

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Wire name used by OpenAI-compatible APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }

    /// Label used when rendering history and transcripts.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "YOU",
            Role::Assistant => "ASSISTANT",
            Role::System => "SYSTEM",
        }
    }
}

/// One entry in the conversation log. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Ordered conversation log, oldest message first.
///
/// Holds User/Assistant pairs once a turn completes; may transiently hold
/// a trailing unanswered User message while a completion call is in flight.
/// Role pairing is the caller's responsibility, not enforced here.
#[derive(Debug, Default)]
pub struct MemoryStore {
    log: Vec<Message>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { log: Vec::new() }
    }

    /// Adds one message to the tail. Always succeeds.
    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.log.push(Message::new(role, content));
        tracing::debug!("[MemoryStore] Appended message, log length {}", self.log.len());
    }

    /// Atomically swaps the entire log. Used by eviction and manual truncation.
    pub fn replace_all(&mut self, messages: Vec<Message>) {
        tracing::debug!(
            "[MemoryStore] Replacing log: {} -> {} messages",
            self.log.len(),
            messages.len()
        );
        self.log = messages;
    }

    /// Empties the log and returns how many messages were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.log.len();
        self.log.clear();
        tracing::debug!("[MemoryStore] Cleared {} messages", removed);
        removed
    }

    /// Read-only ordered view of the log.
    pub fn snapshot(&self) -> &[Message] {
        &self.log
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}
