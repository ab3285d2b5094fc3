use chrono::{DateTime, Utc};
use lesenne_types::Message;
use serde::{Deserialize, Serialize};

/// Persisted per-thread metadata row.
///
/// The store never owns thread content; the memory manager does. These rows
/// exist for listing and reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadRecord {
    pub thread_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: u64,
    pub total_tokens: u64,
}

impl ThreadRecord {
    pub fn new(thread_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            thread_id: thread_id.into(),
            title: title.into(),
            created_at: now,
            updated_at: now,
            message_count: 0,
            total_tokens: 0,
        }
    }
}

/// Append-only persisted message row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub thread_id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl MessageRecord {
    pub fn from_message(thread_id: &str, message: &Message) -> Self {
        let role = if message.is_human() {
            MessageRole::User
        } else {
            MessageRole::Assistant
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            thread_id: thread_id.to_string(),
            role,
            content: message.content().to_string(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl From<MessageRecord> for Message {
    fn from(record: MessageRecord) -> Self {
        match record.role {
            MessageRole::User => Message::human(record.content),
            MessageRole::Assistant => Message::ai(record.content),
        }
    }
}
