use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;
use lesenne_types::LlmConfig;
use std::pin::Pin;

/// Ordered stream of token chunks; their concatenation equals the
/// non-streaming completion for the same prompt.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Trait for single-prompt text completion
///
/// The pipeline treats the language model as an opaque service: one composed
/// prompt in, generated text out, with an optional token-by-token variant.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Non-streaming completion
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// Streaming completion
    async fn complete_stream(&self, request: CompletionRequest) -> Result<TokenStream>;
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub options: CompletionOptions,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            options: CompletionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn from_config(config: &LlmConfig, prompt: impl Into<String>) -> Self {
        Self {
            model: config.model.clone(),
            prompt: prompt.into(),
            options: CompletionOptions {
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }
}
