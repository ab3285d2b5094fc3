use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A retrieved unit of source text with provenance metadata.
///
/// Passages come back from the vector-search service already ordered by
/// descending relevance; the score itself is not part of the contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,

    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Passage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Source document identifier, when the backend provides one
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(|v| v.as_str())
    }

    pub fn page(&self) -> Option<i64> {
        self.metadata.get("page").and_then(|v| v.as_i64())
    }
}
