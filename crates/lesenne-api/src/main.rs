use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lesenne_api::{build_router, config::Config, state::AppState};
use lesenne_llm::{CompletionClient, OpenAIClient};
use lesenne_memory::{MemoryManager, TokenCounter};
use lesenne_persist::{ConversationStore, InMemoryStore};
use lesenne_pipeline::{RagPipeline, StageTracker};
use lesenne_retrieval::HttpRetriever;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Lesenne API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    // LLM client
    let mut openai = OpenAIClient::new(config.openai_api_key.clone())?;
    if let Some(base_url) = &config.llm.base_url {
        openai = openai.with_base_url(base_url.clone());
    }
    let llm: Arc<dyn CompletionClient> = Arc::new(openai);

    // Retriever
    let retriever = Arc::new(HttpRetriever::new(config.retrieval.endpoint.clone()));

    // Conversation store, chosen once for the process lifetime
    let store = build_store(&config).await?;

    // Memory manager; an unknown tokenizer model is fatal at startup
    let counter = TokenCounter::new(&config.llm.model)?;
    let memory = MemoryManager::new(Arc::clone(&store), counter, config.memory.max_tokens);

    // Pipeline with progress tracking
    let tracker = Arc::new(StageTracker::new());
    let pipeline = RagPipeline::new(
        llm,
        retriever,
        config.llm.clone().into(),
        config.pipeline.clone().into(),
    )
    .with_observer(tracker.clone());

    let state = Arc::new(AppState::new(
        config.clone(),
        store,
        pipeline,
        memory,
        tracker,
    ));

    let app = build_router(state)
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(300)))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&config))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn ConversationStore>> {
    match config.storage.backend.as_str() {
        "memory" => {
            tracing::info!("Using in-process conversation store");
            Ok(Arc::new(InMemoryStore::new()))
        }
        #[cfg(feature = "mongodb")]
        "mongodb" => {
            let uri = config
                .mongodb_uri
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("MONGODB_URI is required for the mongodb backend"))?;

            tracing::info!(database = %config.storage.database, "Connecting to MongoDB");
            let store = lesenne_persist::MongoStore::connect(uri, &config.storage.database).await?;
            tracing::info!("MongoDB connected");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongodb"))]
        "mongodb" => {
            anyhow::bail!("this build does not include MongoDB support; rebuild with --features mongodb")
        }
        other => anyhow::bail!("unknown storage backend: {}", other),
    }
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let mut cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors = cors.allow_origin(Any);
        } else {
            for origin in &config.cors.origins {
                if let Ok(parsed_origin) = origin.parse::<axum::http::HeaderValue>() {
                    cors = cors.allow_origin(parsed_origin);
                }
            }
        }

        cors
    } else {
        CorsLayer::permissive()
    }
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
