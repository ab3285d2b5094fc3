pub mod error;
pub mod http;
pub mod retriever;

pub use error::RetrievalError;
pub use http::HttpRetriever;
pub use retriever::Retriever;
