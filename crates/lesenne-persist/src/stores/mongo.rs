use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{bson::doc, Client, Collection};

use crate::error::{Result, StoreError};
use crate::models::{MessageRecord, ThreadRecord};
use crate::store::ConversationStore;

/// MongoDB-backed store with `threads` and `messages` collections.
pub struct MongoStore {
    threads: Collection<ThreadRecord>,
    messages: Collection<MessageRecord>,
}

impl MongoStore {
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self::new(&client, db_name))
    }

    pub fn new(client: &Client, db_name: &str) -> Self {
        let db = client.database(db_name);
        Self {
            threads: db.collection("threads"),
            messages: db.collection("messages"),
        }
    }
}

#[async_trait]
impl ConversationStore for MongoStore {
    async fn create_thread(&self, thread: ThreadRecord) -> Result<()> {
        self.threads.insert_one(&thread).await?;
        Ok(())
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<ThreadRecord>> {
        let filter = doc! { "thread_id": thread_id };
        Ok(self.threads.find_one(filter).await?)
    }

    async fn list_threads(&self) -> Result<Vec<ThreadRecord>> {
        let rows = self
            .threads
            .find(doc! {})
            .sort(doc! { "updated_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(rows)
    }

    async fn update_metadata(
        &self,
        thread_id: &str,
        message_count: u64,
        total_tokens: u64,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let filter = doc! { "thread_id": thread_id };
        let update = doc! {
            "$set": {
                "message_count": message_count as i64,
                "total_tokens": total_tokens as i64,
                "updated_at": updated_at.to_rfc3339(),
            }
        };

        let result = self.threads.update_one(filter, update).await?;
        if result.matched_count == 0 {
            return Err(StoreError::ThreadNotFound(thread_id.to_string()));
        }
        Ok(())
    }

    async fn append_messages(&self, records: Vec<MessageRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        self.messages.insert_many(records).await?;
        Ok(())
    }

    async fn get_messages(&self, thread_id: &str) -> Result<Vec<MessageRecord>> {
        let filter = doc! { "thread_id": thread_id };
        let rows = self
            .messages
            .find(filter)
            .sort(doc! { "created_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(rows)
    }

    async fn clear_messages(&self, thread_id: &str) -> Result<()> {
        let filter = doc! { "thread_id": thread_id };
        self.messages.delete_many(filter).await?;
        Ok(())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        self.messages
            .delete_many(doc! { "thread_id": thread_id })
            .await?;
        self.threads
            .delete_one(doc! { "thread_id": thread_id })
            .await?;
        Ok(())
    }
}
