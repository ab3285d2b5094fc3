use lesenne_persist::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    /// Invalid model or storage configuration, raised at construction only
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, MemoryError>;
