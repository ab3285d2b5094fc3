use lesenne_memory::MemoryManager;
use lesenne_persist::ConversationStore;
use lesenne_pipeline::{RagPipeline, StageTracker};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Config;

/// Shared application state passed to all handlers.
///
/// The pipeline and stores are freely shared across tasks; the memory manager
/// sits behind a mutex because one request mutates conversation state end to
/// end and concurrent turns on the same process must serialize.
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ConversationStore>,
    pub pipeline: Arc<RagPipeline>,
    pub memory: Mutex<MemoryManager>,
    pub tracker: Arc<StageTracker>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn ConversationStore>,
        pipeline: RagPipeline,
        memory: MemoryManager,
        tracker: Arc<StageTracker>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            pipeline: Arc::new(pipeline),
            memory: Mutex::new(memory),
            tracker,
        }
    }
}
