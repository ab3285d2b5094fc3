use lesenne_llm::{CompletionClient, CompletionRequest};
use lesenne_types::{LlmConfig, Message};
use std::sync::Arc;

use crate::prompts::build_contextualize_prompt;

/// Rewrites a follow-up question into a standalone form using prior turns.
///
/// With an empty history the question passes through untouched and no model
/// call is made. A model failure also falls back to the original question;
/// this stage never blocks the pipeline.
pub struct Contextualizer {
    llm: Arc<dyn CompletionClient>,
    config: LlmConfig,
    window: usize,
}

impl Contextualizer {
    pub fn new(llm: Arc<dyn CompletionClient>, config: LlmConfig, window: usize) -> Self {
        Self {
            llm,
            config,
            window,
        }
    }

    pub async fn contextualize(&self, question: &str, history: &[Message]) -> String {
        if history.is_empty() {
            return question.to_string();
        }

        let window_start = history.len().saturating_sub(self.window);
        let prompt = build_contextualize_prompt(&history[window_start..], question);
        let request = CompletionRequest::from_config(&self.config, prompt);

        match self.llm.complete(request).await {
            Ok(rewritten) => {
                let rewritten = rewritten.trim();
                if rewritten.is_empty() {
                    question.to_string()
                } else {
                    tracing::debug!(original = question, rewritten, "question contextualized");
                    rewritten.to_string()
                }
            }
            Err(e) => {
                tracing::warn!("contextualization failed, using original question: {}", e);
                question.to_string()
            }
        }
    }
}
