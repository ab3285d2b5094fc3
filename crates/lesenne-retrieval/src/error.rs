use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Retrieval request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Retrieval backend error {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Malformed retrieval response: {0}")]
    Decode(String),
}
