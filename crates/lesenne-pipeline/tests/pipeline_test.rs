/// Integration tests for the full invoke flow: retrieval ordering,
/// contextualization fallbacks, stage tracking, and memory effects.
use anyhow::Result;
use async_trait::async_trait;
use lesenne_llm::{CompletionClient, CompletionRequest, TokenStream};
use lesenne_memory::{MemoryManager, TokenCounter};
use lesenne_persist::InMemoryStore;
use lesenne_pipeline::{PipelineError, RagPipeline, StageTracker};
use lesenne_retrieval::{RetrievalError, Retriever};
use lesenne_types::{LlmConfig, Passage, PipelineConfig, ProcessingStage, STAGE_SEQUENCE};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Scripted completion client: pops one canned response per call and records
/// every prompt it receives.
struct MockLlm {
    responses: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockLlm {
    fn new(responses: &[&str]) -> Self {
        Self::scripted(responses.iter().map(|s| Ok(s.to_string())).collect())
    }

    /// Script each call's outcome, including failures for individual slots.
    fn scripted(responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn next_response(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Err(anyhow::anyhow!("mock ran out of responses")),
        }
    }
}

#[async_trait]
impl CompletionClient for MockLlm {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.next_response(&request)
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<TokenStream> {
        let text = self.next_response(&request)?;
        let chunks: Vec<Result<String>> = text
            .split_inclusive(' ')
            .map(|s| Ok(s.to_string()))
            .collect();
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}

/// Completion client that always fails.
struct FailingLlm;

#[async_trait]
impl CompletionClient for FailingLlm {
    async fn complete(&self, _request: CompletionRequest) -> Result<String> {
        anyhow::bail!("model unavailable")
    }

    async fn complete_stream(&self, _request: CompletionRequest) -> Result<TokenStream> {
        anyhow::bail!("model unavailable")
    }
}

/// Retriever spy capturing the exact query argument of every call.
struct SpyRetriever {
    queries: Mutex<Vec<String>>,
    passages: Vec<Passage>,
}

impl SpyRetriever {
    fn new(passages: Vec<Passage>) -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
            passages,
        }
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for SpyRetriever {
    async fn retrieve(&self, query: &str, _top_k: usize) -> Result<Vec<Passage>, RetrievalError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.passages.clone())
    }
}

struct FailingRetriever;

#[async_trait]
impl Retriever for FailingRetriever {
    async fn retrieve(&self, _query: &str, _top_k: usize) -> Result<Vec<Passage>, RetrievalError> {
        Err(RetrievalError::Backend {
            status: 503,
            body: "index unavailable".to_string(),
        })
    }
}

fn sample_passages() -> Vec<Passage> {
    vec![
        Passage::new("L'émotivité est la disposition à être ébranlé par les événements.")
            .with_metadata("source", serde_json::json!("traite")),
        Passage::new("L'activité est la disposition à agir spontanément.")
            .with_metadata("page", serde_json::json!(42)),
    ]
}

fn new_memory() -> MemoryManager {
    MemoryManager::new(
        Arc::new(InMemoryStore::new()),
        TokenCounter::new("gpt-4o-mini").unwrap(),
        4000,
    )
}

fn new_pipeline(llm: Arc<dyn CompletionClient>, retriever: Arc<dyn Retriever>) -> RagPipeline {
    RagPipeline::new(
        llm,
        retriever,
        LlmConfig::default(),
        PipelineConfig::default(),
    )
}

#[tokio::test]
async fn first_question_produces_one_full_exchange() {
    let llm = Arc::new(MockLlm::new(&["L'émotivité est une disposition fondamentale."]));
    let retriever = Arc::new(SpyRetriever::new(sample_passages()));
    let pipeline = new_pipeline(llm.clone(), retriever);
    let mut memory = new_memory();

    let output = pipeline
        .invoke(&mut memory, "Qu'est-ce que l'émotivité ?")
        .await
        .unwrap();

    assert!(!output.answer.is_empty());
    assert!(!output.thread_id.is_empty());
    assert!(!output.message_id.is_empty());

    let history = memory.get_history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role(), "user");
    assert_eq!(history[1].role(), "assistant");
    assert!(memory.get_token_count() > 0);
}

#[tokio::test]
async fn retrieval_receives_the_original_question_across_turns() {
    let llm = Arc::new(MockLlm::new(&[
        // turn 1: generation only (empty history skips the rewrite)
        "L'émotivité est une disposition fondamentale.",
        // turn 2: rewrite, then generation
        "Comment l'émotivité se rapporte-t-elle à l'activité ?",
        "Les deux dispositions se combinent dans les huit types.",
    ]));
    let retriever = Arc::new(SpyRetriever::new(sample_passages()));
    let pipeline = new_pipeline(llm.clone(), retriever.clone());
    let mut memory = new_memory();

    pipeline
        .invoke(&mut memory, "Qu'est-ce que l'émotivité ?")
        .await
        .unwrap();
    pipeline
        .invoke(&mut memory, "Comment cela se rapporte-t-il à l'activité ?")
        .await
        .unwrap();

    // The retriever saw both questions exactly as the user asked them.
    assert_eq!(
        retriever.queries(),
        vec![
            "Qu'est-ce que l'émotivité ?".to_string(),
            "Comment cela se rapporte-t-il à l'activité ?".to_string(),
        ]
    );

    // The generation prompt of turn 2 embeds both prior turns and the
    // rewritten question, not the literal follow-up alone.
    let prompts = llm.prompts();
    let final_prompt = prompts.last().unwrap();
    assert!(final_prompt.contains("Qu'est-ce que l'émotivité ?"));
    assert!(final_prompt.contains("L'émotivité est une disposition fondamentale."));
    assert!(final_prompt.contains("Comment l'émotivité se rapporte-t-elle à l'activité ?"));
}

#[tokio::test]
async fn empty_history_skips_the_rewrite_call() {
    let llm = Arc::new(MockLlm::new(&["Réponse."]));
    let retriever = Arc::new(SpyRetriever::new(sample_passages()));
    let pipeline = new_pipeline(llm.clone(), retriever);
    let mut memory = new_memory();

    pipeline
        .invoke(&mut memory, "Qu'est-ce que le retentissement ?")
        .await
        .unwrap();

    // One model call total: the answer generation.
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn rewrite_failure_falls_back_to_the_original_question() {
    let llm = Arc::new(MockLlm::scripted(vec![
        // turn 1: generation
        Ok("Première réponse.".to_string()),
        // turn 2: the rewrite call fails, then generation succeeds
        Err("rewrite backend down".to_string()),
        Ok("Réponse de secours.".to_string()),
    ]));
    let retriever = Arc::new(SpyRetriever::new(sample_passages()));
    let pipeline = new_pipeline(llm.clone(), retriever);
    let mut memory = new_memory();

    pipeline
        .invoke(&mut memory, "Première question ?")
        .await
        .unwrap();
    let output = pipeline
        .invoke(&mut memory, "Et le retentissement ?")
        .await
        .unwrap();

    assert_eq!(output.answer, "Réponse de secours.");

    // The generation prompt carries the unrewritten follow-up.
    let prompts = llm.prompts();
    assert!(prompts.last().unwrap().contains("Et le retentissement ?"));
    assert_eq!(memory.get_history().len(), 4);
}

#[tokio::test]
async fn successful_invoke_completes_the_full_stage_sequence() {
    let llm = Arc::new(MockLlm::new(&["Réponse."]));
    let retriever = Arc::new(SpyRetriever::new(sample_passages()));
    let tracker = Arc::new(StageTracker::new());
    let pipeline = new_pipeline(llm, retriever).with_observer(tracker.clone());
    let mut memory = new_memory();

    pipeline
        .invoke(&mut memory, "Qu'est-ce que l'émotivité ?")
        .await
        .unwrap();

    assert_eq!(tracker.current_stage(), ProcessingStage::Completed);
    assert_eq!(tracker.completed_stages(), STAGE_SEQUENCE.to_vec());
}

#[tokio::test]
async fn generation_failure_leaves_the_thread_unmodified() {
    let retriever = Arc::new(SpyRetriever::new(sample_passages()));
    let pipeline = new_pipeline(Arc::new(FailingLlm), retriever);
    let mut memory = new_memory();

    let before = memory.get_history().len();
    let result = pipeline.invoke(&mut memory, "Question ?").await;

    assert!(matches!(result, Err(PipelineError::Generation(_))));
    assert_eq!(memory.get_history().len(), before);
}

#[tokio::test]
async fn retrieval_failure_aborts_without_saving() {
    let llm = Arc::new(MockLlm::new(&["jamais utilisé"]));
    let pipeline = new_pipeline(llm.clone(), Arc::new(FailingRetriever));
    let mut memory = new_memory();

    let result = pipeline.invoke(&mut memory, "Question ?").await;

    assert!(matches!(result, Err(PipelineError::Retrieval(_))));
    assert_eq!(memory.get_history().len(), 0);
    // The model was never consulted.
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn streamed_chunks_concatenate_to_the_returned_answer() {
    let llm = Arc::new(MockLlm::new(&["Les huit types combinent trois dispositions."]));
    let retriever = Arc::new(SpyRetriever::new(sample_passages()));
    let pipeline = new_pipeline(llm, retriever);
    let mut memory = new_memory();

    let (tx, mut rx) = mpsc::channel(64);
    let output = pipeline
        .invoke_streaming(&mut memory, "Combien de types ?", tx)
        .await
        .unwrap();

    let mut streamed = String::new();
    while let Some(chunk) = rx.recv().await {
        streamed.push_str(&chunk);
    }

    assert_eq!(streamed, output.answer);
    assert_eq!(memory.get_history()[1].content(), output.answer);
}

#[tokio::test]
async fn tracker_resets_between_requests() {
    let llm = Arc::new(MockLlm::new(&["Une.", "Deux.", "Trois."]));
    let retriever = Arc::new(SpyRetriever::new(sample_passages()));
    let tracker = Arc::new(StageTracker::new());
    let pipeline = new_pipeline(llm, retriever).with_observer(tracker.clone());
    let mut memory = new_memory();

    pipeline.invoke(&mut memory, "Première ?").await.unwrap();
    pipeline.invoke(&mut memory, "Seconde ?").await.unwrap();

    // No accumulation across requests: still exactly the five stages.
    assert_eq!(tracker.completed_stages(), STAGE_SEQUENCE.to_vec());
}
