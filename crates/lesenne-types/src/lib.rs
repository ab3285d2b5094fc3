pub mod message;
pub mod passage;
pub mod stages;
pub mod state;
pub mod config;

pub use message::Message;
pub use passage::Passage;
pub use stages::{ProcessingStage, StageEvent, STAGE_SEQUENCE};
pub use state::{RagState, RagOutput};
pub use config::{LlmConfig, PipelineConfig};
