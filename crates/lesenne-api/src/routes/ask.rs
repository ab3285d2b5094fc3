use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::Json;
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use utoipa::ToSchema;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AskRequest {
    pub question: String,
    /// Continue an existing conversation; omit to use the active one
    #[serde(default)]
    pub thread_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AskResponse {
    pub answer: String,
    pub thread_id: String,
    pub message_id: String,
}

/// Answer a question against the treatise, blocking until complete
#[utoipa::path(
    post,
    path = "/ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Answer generated", body = AskResponse),
        (status = 400, description = "Empty question"),
        (status = 404, description = "Thread not found"),
        (status = 502, description = "Retrieval or generation backend failed")
    ),
    tag = "lesenne"
)]
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> ApiResult<Json<AskResponse>> {
    let question = req.question.trim();
    if question.is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".to_string()));
    }

    let mut memory = state.memory.lock().await;

    if let Some(thread_id) = &req.thread_id {
        state
            .store
            .get_thread(thread_id)
            .await?
            .ok_or_else(|| ApiError::ThreadNotFound(thread_id.clone()))?;
        memory.resume(thread_id).await?;
    }

    let output = state.pipeline.invoke(&mut memory, question).await?;

    Ok(Json(AskResponse {
        answer: output.answer,
        thread_id: output.thread_id,
        message_id: output.message_id,
    }))
}

/// Answer a question, streaming tokens over Server-Sent Events.
///
/// Emits `token` events while the model generates, then exactly one terminal
/// event: `done` with the cleaned answer and ids, or `error`. The `done`
/// answer is the authoritative text; the token concatenation may still carry
/// echoes that cleaning removes.
#[utoipa::path(
    post,
    path = "/ask/stream",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Streaming answer", content_type = "text/event-stream"),
        (status = 400, description = "Empty question"),
        (status = 404, description = "Thread not found")
    ),
    tag = "lesenne"
)]
pub async fn ask_stream(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let question = req.question.trim().to_string();
    if question.is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".to_string()));
    }

    // Reject unknown threads before committing to a stream response.
    if let Some(thread_id) = &req.thread_id {
        state
            .store
            .get_thread(thread_id)
            .await?
            .ok_or_else(|| ApiError::ThreadNotFound(thread_id.clone()))?;
    }

    let (tx, mut rx) = mpsc::channel::<String>(64);
    let worker_state = Arc::clone(&state);
    let thread_id = req.thread_id.clone();

    let worker = tokio::spawn(async move {
        let mut memory = worker_state.memory.lock().await;
        if let Some(id) = &thread_id {
            memory.resume(id).await.map_err(ApiError::from)?;
        }
        worker_state
            .pipeline
            .invoke_streaming(&mut memory, &question, tx)
            .await
            .map_err(ApiError::from)
    });

    let sse_stream = async_stream::stream! {
        while let Some(chunk) = rx.recv().await {
            let event = Event::default()
                .event("token")
                .json_data(serde_json::json!({ "content": chunk }));
            yield Ok::<Event, Infallible>(event.unwrap());
        }

        let closing = match worker.await {
            Ok(Ok(output)) => Event::default().event("done").json_data(serde_json::json!({
                "answer": output.answer,
                "thread_id": output.thread_id,
                "message_id": output.message_id,
            })),
            Ok(Err(error)) => Event::default().event("error").json_data(serde_json::json!({
                "error": error.to_string(),
            })),
            Err(join_error) => Event::default().event("error").json_data(serde_json::json!({
                "error": join_error.to_string(),
            })),
        };
        yield Ok::<Event, Infallible>(closing.unwrap());
    };

    Ok(Sse::new(sse_stream))
}
