use lesenne_llm::CompletionClient;
use lesenne_memory::MemoryManager;
use lesenne_retrieval::Retriever;
use lesenne_types::{LlmConfig, PipelineConfig, ProcessingStage, RagOutput, RagState, StageEvent};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::clean::clean_response;
use crate::contextualize::Contextualizer;
use crate::error::PipelineError;
use crate::generate::AnswerGenerator;
use crate::tracker::StageObserver;

/// The retrieval-augmented answering pipeline.
///
/// One invocation runs a strict sequence — retrieve, contextualize, generate,
/// save — with a `RagState` threaded through the stages and a stage event
/// emitted at each transition. The memory manager is passed in by the caller
/// on every call; the pipeline itself holds no conversation state and can be
/// shared across sessions.
pub struct RagPipeline {
    retriever: Arc<dyn Retriever>,
    contextualizer: Contextualizer,
    generator: AnswerGenerator,
    config: PipelineConfig,
    observers: Vec<Arc<dyn StageObserver>>,
}

impl RagPipeline {
    pub fn new(
        llm: Arc<dyn CompletionClient>,
        retriever: Arc<dyn Retriever>,
        llm_config: LlmConfig,
        config: PipelineConfig,
    ) -> Self {
        Self {
            retriever,
            contextualizer: Contextualizer::new(
                Arc::clone(&llm),
                llm_config.clone(),
                config.contextualize_window,
            ),
            generator: AnswerGenerator::new(llm, llm_config),
            config,
            observers: Vec::new(),
        }
    }

    /// Register a stage observer (progress tracker, logger, ...)
    pub fn with_observer(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Answer a question against the caller's conversation memory.
    pub async fn invoke(
        &self,
        memory: &mut MemoryManager,
        question: &str,
    ) -> Result<RagOutput, PipelineError> {
        self.run(memory, question, None).await
    }

    /// Same as [`invoke`](Self::invoke), but forwards answer tokens to `sink`
    /// as they are generated. The returned answer text is identical to the
    /// non-streaming result.
    pub async fn invoke_streaming(
        &self,
        memory: &mut MemoryManager,
        question: &str,
        sink: mpsc::Sender<String>,
    ) -> Result<RagOutput, PipelineError> {
        self.run(memory, question, Some(sink)).await
    }

    async fn run(
        &self,
        memory: &mut MemoryManager,
        question: &str,
        sink: Option<mpsc::Sender<String>>,
    ) -> Result<RagOutput, PipelineError> {
        let start = Instant::now();

        for observer in &self.observers {
            observer.on_request_start();
        }
        self.emit(ProcessingStage::QuestionProcessing);

        let mut state = RagState::new(question, memory.get_history().to_vec());

        // Retrieval always uses the question as asked, never a rewrite.
        self.emit(ProcessingStage::DocumentRetrieval);
        state.context = self
            .retriever
            .retrieve(&state.question, self.config.top_k)
            .await?;
        tracing::info!(
            question = %state.question,
            passages = state.context.len(),
            "context retrieved"
        );

        state.working_question = self
            .contextualizer
            .contextualize(&state.question, &state.chat_history)
            .await;
        self.emit(ProcessingStage::ContextGeneration);

        self.emit(ProcessingStage::ResponseGeneration);
        let raw_answer = self
            .generator
            .generate(&state, sink)
            .await
            .map_err(PipelineError::Generation)?;
        state.answer = clean_response(&raw_answer, &state.question);

        self.emit(ProcessingStage::MemorySaving);
        let turn = memory.save_context(&state.question, &state.answer).await?;

        self.emit(ProcessingStage::Completed);
        tracing::info!(
            thread_id = %turn.thread_id,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "request completed"
        );

        Ok(RagOutput {
            answer: state.answer,
            thread_id: turn.thread_id,
            message_id: turn.assistant_message_id,
        })
    }

    fn emit(&self, stage: ProcessingStage) {
        let event = StageEvent::new(stage);
        for observer in &self.observers {
            observer.on_stage(&event);
        }
    }
}
