use lesenne_memory::MemoryError;
use lesenne_retrieval::RetrievalError;
use thiserror::Error;

/// Failures that abort a pipeline invocation.
///
/// A failed request leaves the conversation thread untouched; the variant
/// tells the caller which stage gave up. Contextualization failures never
/// appear here — they are absorbed by falling back to the unrewritten
/// question.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Document retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Answer generation failed: {0}")]
    Generation(#[source] anyhow::Error),

    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),
}
