use lesenne_types::Message;
use tiktoken_rs::{get_bpe_from_model, CoreBPE};

use crate::error::{MemoryError, Result};

/// Token accounting against the tokenizer of a configured model.
///
/// Pure and deterministic; an unsupported model name fails here at
/// construction, never per call.
pub struct TokenCounter {
    bpe: CoreBPE,
    model: String,
}

impl TokenCounter {
    pub fn new(model: impl Into<String>) -> Result<Self> {
        let model = model.into();
        let bpe = get_bpe_from_model(&model).map_err(|e| {
            MemoryError::Configuration(format!("no tokenizer for model {}: {}", model, e))
        })?;

        Ok(Self { bpe, model })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Token count of a piece of text
    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    /// Summed token count over a message sequence
    pub fn count_all(&self, messages: &[Message]) -> usize {
        messages.iter().map(|m| self.count(m.content())).sum()
    }
}
