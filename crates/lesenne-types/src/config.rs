use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl LlmConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: Some(0.5),
            max_tokens: Some(1000),
        }
    }
}

/// Knobs for one pipeline instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of passages requested from the retriever
    pub top_k: usize,
    /// Most recent history messages included in the rewrite prompt
    pub contextualize_window: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            contextualize_window: 6,
        }
    }
}

impl PipelineConfig {
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_contextualize_window(mut self, window: usize) -> Self {
        self.contextualize_window = window;
        self
    }
}
