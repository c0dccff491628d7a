//! Chat transcripts for the fleet assistant.
//!
//! Conversations are kept as one JSON list under a single store key and the whole list is
//! rewritten on every mutation. [`ChatSession`] layers the delayed assistant replies on top.

mod history;
mod session;
mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use history::{ChatHistory, CONVERSATIONS_KEY};
pub use session::{ChatSession, ReplyTicket, DEFAULT_REPLY_DELAY};
pub use store::{FileStore, InMemoryStore, KeyValueStore};

#[derive(Debug, thiserror::Error)]
pub enum ChatStoreError {
    #[error("chat store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored conversations are malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("chat store unavailable: {0}")]
    Unavailable(String),
    #[error("conversation {0} not found")]
    UnknownConversation(u64),
    #[error("message is empty")]
    EmptyMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatConversation {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatConversation {
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}
