use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{MessageRecord, ThreadRecord};

/// Trait for conversation persistence operations
///
/// The memory manager is the only writer. The backend is chosen once at
/// startup from configuration; nothing inspects the store's shape at runtime.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Insert a fresh thread metadata row
    async fn create_thread(&self, thread: ThreadRecord) -> Result<()>;

    /// Get a thread by id
    async fn get_thread(&self, thread_id: &str) -> Result<Option<ThreadRecord>>;

    /// List all threads, most recently updated first
    async fn list_threads(&self) -> Result<Vec<ThreadRecord>>;

    /// Update a thread's cached counts and timestamp
    async fn update_metadata(
        &self,
        thread_id: &str,
        message_count: u64,
        total_tokens: u64,
        updated_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Append messages to the thread's log
    async fn append_messages(&self, messages: Vec<MessageRecord>) -> Result<()>;

    /// Get a thread's messages in chronological order
    async fn get_messages(&self, thread_id: &str) -> Result<Vec<MessageRecord>>;

    /// Remove a thread's messages, keeping the metadata row
    async fn clear_messages(&self, thread_id: &str) -> Result<()>;

    /// Remove a thread and its messages entirely
    async fn delete_thread(&self, thread_id: &str) -> Result<()>;
}
