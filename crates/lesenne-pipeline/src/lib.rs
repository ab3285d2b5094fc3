pub mod clean;
pub mod contextualize;
pub mod error;
pub mod generate;
pub mod pipeline;
pub mod prompts;
pub mod tracker;

pub use clean::clean_response;
pub use contextualize::Contextualizer;
pub use error::PipelineError;
pub use generate::AnswerGenerator;
pub use pipeline::RagPipeline;
pub use tracker::{StageObserver, StageTracker};

// Re-export key types
pub use lesenne_types::{Message, Passage, ProcessingStage, RagOutput, RagState, StageEvent};
