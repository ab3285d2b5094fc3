use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::models::{MessageRecord, ThreadRecord};
use crate::store::ConversationStore;

/// Process-local store backed by hash maps.
///
/// The default backend for single-instance deployments and tests.
#[derive(Default)]
pub struct InMemoryStore {
    threads: RwLock<HashMap<String, ThreadRecord>>,
    messages: RwLock<HashMap<String, Vec<MessageRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn create_thread(&self, thread: ThreadRecord) -> Result<()> {
        let mut threads = self.threads.write().await;
        threads.insert(thread.thread_id.clone(), thread);
        Ok(())
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<ThreadRecord>> {
        let threads = self.threads.read().await;
        Ok(threads.get(thread_id).cloned())
    }

    async fn list_threads(&self) -> Result<Vec<ThreadRecord>> {
        let threads = self.threads.read().await;
        let mut rows: Vec<ThreadRecord> = threads.values().cloned().collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rows)
    }

    async fn update_metadata(
        &self,
        thread_id: &str,
        message_count: u64,
        total_tokens: u64,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut threads = self.threads.write().await;
        let thread = threads
            .get_mut(thread_id)
            .ok_or_else(|| StoreError::ThreadNotFound(thread_id.to_string()))?;

        thread.message_count = message_count;
        thread.total_tokens = total_tokens;
        thread.updated_at = updated_at;
        Ok(())
    }

    async fn append_messages(&self, records: Vec<MessageRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut messages = self.messages.write().await;
        for record in records {
            messages
                .entry(record.thread_id.clone())
                .or_default()
                .push(record);
        }
        Ok(())
    }

    async fn get_messages(&self, thread_id: &str) -> Result<Vec<MessageRecord>> {
        let messages = self.messages.read().await;
        Ok(messages.get(thread_id).cloned().unwrap_or_default())
    }

    async fn clear_messages(&self, thread_id: &str) -> Result<()> {
        let mut messages = self.messages.write().await;
        messages.remove(thread_id);
        Ok(())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let mut threads = self.threads.write().await;
        let mut messages = self.messages.write().await;
        threads.remove(thread_id);
        messages.remove(thread_id);
        Ok(())
    }
}
