pub mod error;
pub mod models;
pub mod store;
pub mod stores;

pub use error::{Result, StoreError};
pub use models::{MessageRecord, MessageRole, ThreadRecord};
pub use store::ConversationStore;
pub use stores::memory::InMemoryStore;

#[cfg(feature = "mongodb")]
pub use stores::mongo::MongoStore;
