pub mod ask;
pub mod health;
pub mod progress;
pub mod threads;

use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        ask::ask,
        ask::ask_stream,
        progress::get_progress,
        threads::create_thread,
        threads::list_threads,
        threads::get_thread,
        threads::clear_thread,
        threads::delete_thread,
    ),
    components(schemas(
        ask::AskRequest,
        ask::AskResponse,
        progress::ProgressResponse,
        threads::CreateThreadRequest,
        threads::ThreadSummary,
        threads::ThreadDetail,
        threads::MessageView,
    )),
    tags(
        (name = "lesenne", description = "Conversational QA over the characterology treatise")
    )
)]
pub struct ApiDoc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Question answering
        .route("/ask", post(ask::ask))
        .route("/ask/stream", post(ask::ask_stream))
        .route("/progress", get(progress::get_progress))
        // Threads
        .route(
            "/threads",
            post(threads::create_thread).get(threads::list_threads),
        )
        .route(
            "/threads/:thread_id",
            get(threads::get_thread).delete(threads::delete_thread),
        )
        .route("/threads/:thread_id/clear", post(threads::clear_thread))
        // API schema
        .route("/api/openapi.json", get(openapi_spec))
        .with_state(state)
}

async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
