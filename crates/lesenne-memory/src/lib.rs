pub mod error;
pub mod manager;
pub mod tokens;

pub use error::MemoryError;
pub use manager::{MemoryManager, SavedTurn};
pub use tokens::TokenCounter;
