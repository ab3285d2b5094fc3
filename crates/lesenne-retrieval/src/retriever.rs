use async_trait::async_trait;
use lesenne_types::Passage;

use crate::error::RetrievalError;

/// Trait for the external vector-similarity search backend
///
/// Implementations return passages ordered by descending relevance. The
/// pipeline always passes the original user question, never a rewritten one,
/// and never retries on failure.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Passage>, RetrievalError>;
}
