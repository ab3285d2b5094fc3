use chrono::Utc;
use lesenne_persist::{ConversationStore, MessageRecord, ThreadRecord};
use lesenne_types::Message;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::tokens::TokenCounter;

/// Ids produced by one persisted (question, answer) exchange.
#[derive(Debug, Clone)]
pub struct SavedTurn {
    pub thread_id: String,
    pub user_message_id: String,
    pub assistant_message_id: String,
}

/// Owner of all conversation threads and their token-budgeted message logs.
///
/// The in-memory log is the source of truth for the live session; the
/// conversation store is an advisory persistence surface for metadata and
/// transcripts. `save_context` is the only mutator of thread content, and the
/// caller is expected to serialize calls per thread (the API layer holds the
/// manager behind a mutex).
pub struct MemoryManager {
    store: Arc<dyn ConversationStore>,
    counter: TokenCounter,
    max_tokens: usize,
    threads: HashMap<String, Vec<Message>>,
    current: Option<String>,
}

impl MemoryManager {
    pub fn new(store: Arc<dyn ConversationStore>, counter: TokenCounter, max_tokens: usize) -> Self {
        Self {
            store,
            counter,
            max_tokens,
            threads: HashMap::new(),
            current: None,
        }
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Create a new conversation thread and make it current.
    pub async fn create_thread(&mut self, title: Option<String>) -> Result<String> {
        let thread_id = uuid::Uuid::new_v4().to_string();
        let title = title
            .unwrap_or_else(|| format!("Conversation {}", Utc::now().format("%Y-%m-%d %H:%M")));

        self.store
            .create_thread(ThreadRecord::new(&thread_id, title))
            .await?;

        self.threads.insert(thread_id.clone(), Vec::new());
        self.current = Some(thread_id.clone());

        tracing::debug!(%thread_id, "thread created");
        Ok(thread_id)
    }

    pub fn set_current(&mut self, thread_id: &str) {
        self.threads.entry(thread_id.to_string()).or_default();
        self.current = Some(thread_id.to_string());
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Current thread id, lazily creating a default thread when none is set.
    pub async fn ensure_current(&mut self) -> Result<String> {
        match &self.current {
            Some(id) => Ok(id.clone()),
            None => self.create_thread(None).await,
        }
    }

    /// Make a persisted thread current again, reloading its message log from
    /// the store when this process has not seen it yet.
    pub async fn resume(&mut self, thread_id: &str) -> Result<()> {
        if !self.threads.contains_key(thread_id) {
            let records = self.store.get_messages(thread_id).await?;
            let messages: Vec<Message> = records.into_iter().map(Message::from).collect();
            let messages = self.trim_to_budget(messages);
            self.threads.insert(thread_id.to_string(), messages);
        }
        self.current = Some(thread_id.to_string());
        Ok(())
    }

    /// Append one (question, answer) exchange to the current thread, trim the
    /// log to the token budget, and persist metadata and transcript rows.
    ///
    /// The pair is appended atomically: either both messages enter the log or
    /// neither does. A store failure is surfaced after the in-memory log has
    /// already been updated.
    pub async fn save_context(&mut self, question: &str, answer: &str) -> Result<SavedTurn> {
        let thread_id = self.ensure_current().await?;

        let user_message = Message::human(question);
        let ai_message = Message::ai(answer);

        let mut log = self.threads.remove(&thread_id).unwrap_or_default();
        log.push(user_message.clone());
        log.push(ai_message.clone());

        let trimmed = self.trim_to_budget(log);
        let message_count = trimmed.len() as u64;
        let total_tokens = self.counter.count_all(&trimmed) as u64;
        self.threads.insert(thread_id.clone(), trimmed);

        let user_record = MessageRecord::from_message(&thread_id, &user_message);
        let ai_record = MessageRecord::from_message(&thread_id, &ai_message);
        let turn = SavedTurn {
            thread_id: thread_id.clone(),
            user_message_id: user_record.id.clone(),
            assistant_message_id: ai_record.id.clone(),
        };

        self.store
            .append_messages(vec![user_record, ai_record])
            .await?;
        self.store
            .update_metadata(&thread_id, message_count, total_tokens, Utc::now())
            .await?;

        tracing::debug!(%thread_id, message_count, total_tokens, "context saved");
        Ok(turn)
    }

    /// Current thread's trimmed message log; empty when no thread is set.
    pub fn get_history(&self) -> &[Message] {
        self.current
            .as_ref()
            .and_then(|id| self.threads.get(id))
            .map(|log| log.as_slice())
            .unwrap_or(&[])
    }

    /// Token count of the current history, recomputed on every call so it
    /// always reflects the latest trim.
    pub fn get_token_count(&self) -> usize {
        self.counter.count_all(self.get_history())
    }

    /// Empty a thread's message log and reset its persisted counts. The
    /// thread itself survives.
    pub async fn clear(&mut self, thread_id: Option<&str>) -> Result<()> {
        let thread_id = match thread_id {
            Some(id) => id.to_string(),
            None => self.ensure_current().await?,
        };

        self.threads.insert(thread_id.clone(), Vec::new());
        self.store.clear_messages(&thread_id).await?;
        self.store
            .update_metadata(&thread_id, 0, 0, Utc::now())
            .await?;
        Ok(())
    }

    /// Remove a thread and its persisted state entirely. If it was current,
    /// no thread is current afterwards.
    pub async fn delete(&mut self, thread_id: &str) -> Result<()> {
        self.threads.remove(thread_id);
        self.store.delete_thread(thread_id).await?;

        if self.current.as_deref() == Some(thread_id) {
            self.current = None;
        }
        Ok(())
    }

    /// All thread metadata rows, most recently updated first.
    pub async fn list_threads(&self) -> Result<Vec<ThreadRecord>> {
        Ok(self.store.list_threads().await?)
    }

    /// Metadata for one thread (the current one when unspecified).
    pub async fn thread_summary(&self, thread_id: Option<&str>) -> Result<Option<ThreadRecord>> {
        let thread_id = match thread_id.or(self.current.as_deref()) {
            Some(id) => id,
            None => return Ok(None),
        };
        Ok(self.store.get_thread(thread_id).await?)
    }

    /// Keep the most recent messages whose summed token count fits the
    /// budget, walking backward from the end of the log. If even the single
    /// most recent message exceeds the budget alone, keep exactly that one;
    /// a successful save never produces an empty history.
    fn trim_to_budget(&self, messages: Vec<Message>) -> Vec<Message> {
        if self.counter.count_all(&messages) <= self.max_tokens {
            return messages;
        }

        let mut kept: Vec<Message> = Vec::new();
        let mut used = 0usize;

        for message in messages.iter().rev() {
            let cost = self.counter.count(message.content());
            if used + cost > self.max_tokens {
                break;
            }
            kept.push(message.clone());
            used += cost;
        }

        if kept.is_empty() {
            if let Some(last) = messages.last() {
                kept.push(last.clone());
            }
        }

        kept.reverse();
        kept
    }
}
