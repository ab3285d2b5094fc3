use anyhow::Result;
use futures::StreamExt;
use lesenne_llm::{CompletionClient, CompletionRequest};
use lesenne_types::{LlmConfig, RagState};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::prompts::build_qa_prompt;

/// Composes the grounded answering prompt and runs the model once.
///
/// The prompt embeds the full history snapshot, the concatenated passages in
/// retrieval order, and the working (possibly contextualized) question —
/// while those passages were fetched with the original question. That
/// asymmetry is intended.
pub struct AnswerGenerator {
    llm: Arc<dyn CompletionClient>,
    config: LlmConfig,
}

impl AnswerGenerator {
    pub fn new(llm: Arc<dyn CompletionClient>, config: LlmConfig) -> Self {
        Self { llm, config }
    }

    /// Generate the raw answer text. When a sink is given, token chunks are
    /// forwarded in emission order as they arrive; the returned text is their
    /// concatenation either way.
    pub async fn generate(
        &self,
        state: &RagState,
        sink: Option<mpsc::Sender<String>>,
    ) -> Result<String> {
        let prompt = build_qa_prompt(&state.chat_history, &state.context, &state.working_question);
        let request = CompletionRequest::from_config(&self.config, prompt);

        match sink {
            None => self.llm.complete(request).await,
            Some(sink) => {
                let mut stream = self.llm.complete_stream(request).await?;
                let mut answer = String::new();

                while let Some(chunk) = stream.next().await {
                    let chunk = chunk?;
                    answer.push_str(&chunk);
                    // A dropped receiver only means the display went away.
                    let _ = sink.send(chunk).await;
                }

                Ok(answer)
            }
        }
    }
}
