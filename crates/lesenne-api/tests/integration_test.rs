use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use lesenne_api::{build_router, AppState, Config};
use lesenne_llm::CompletionClient;
use lesenne_memory::{MemoryManager, TokenCounter};
use lesenne_persist::InMemoryStore;
use lesenne_pipeline::{RagPipeline, StageTracker};
use lesenne_retrieval::HttpRetriever;
use std::sync::Arc;
use tower::ServiceExt;

const TEST_CONFIG: &str = r#"
    [server]
    host = "127.0.0.1"
    port = 0

    [cors]
    enabled = false
    origins = []

    [storage]
    backend = "memory"
    database = "lesenne-test"

    [llm]
    model = "gpt-4o-mini"
    temperature = 0.5
    max_tokens = 1000

    [memory]
    max_tokens = 4000

    [pipeline]
    top_k = 10
    contextualize_window = 6

    [retrieval]
    endpoint = "http://localhost:9200/search"

    [logging]
    level = "debug"
    format = "pretty"
"#;

fn test_state() -> Arc<AppState> {
    let config: Config = toml::from_str(TEST_CONFIG).unwrap();

    let store = Arc::new(InMemoryStore::new());
    let llm: Arc<dyn CompletionClient> =
        Arc::new(lesenne_llm::OpenAIClient::new("test-key").unwrap());
    let retriever = Arc::new(HttpRetriever::new(config.retrieval.endpoint.clone()));

    let counter = TokenCounter::new(&config.llm.model).unwrap();
    let memory = MemoryManager::new(store.clone(), counter, config.memory.max_tokens);

    let tracker = Arc::new(StageTracker::new());
    let pipeline = RagPipeline::new(
        llm,
        retriever,
        config.llm.clone().into(),
        config.pipeline.clone().into(),
    )
    .with_observer(tracker.clone());

    Arc::new(AppState::new(config, store, pipeline, memory, tracker))
}

#[tokio::test]
async fn health_check_responds_ok() {
    let app = build_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn empty_question_is_rejected() {
    let app = build_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ask")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"question": "   "}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn asking_on_an_unknown_thread_is_a_404() {
    let app = build_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ask")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"question": "Qu'est-ce que l'émotivité ?", "thread_id": "missing"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn thread_lifecycle_over_http() {
    let state = test_state();

    // Create
    let response = build_router(state.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/threads")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title": "Essai"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // List
    let response = build_router(state.clone())
        .oneshot(
            Request::builder()
                .uri("/threads")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Delete something that never existed
    let response = build_router(state)
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/threads/does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn progress_starts_idle() {
    let app = build_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/progress")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
