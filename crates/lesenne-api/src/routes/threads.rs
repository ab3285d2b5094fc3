use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use lesenne_persist::{MessageRecord, MessageRole, ThreadRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateThreadRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ThreadSummary {
    pub thread_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: u64,
    pub total_tokens: u64,
}

impl From<ThreadRecord> for ThreadSummary {
    fn from(record: ThreadRecord) -> Self {
        Self {
            thread_id: record.thread_id,
            title: record.title,
            created_at: record.created_at,
            updated_at: record.updated_at,
            message_count: record.message_count,
            total_tokens: record.total_tokens,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageView {
    pub id: String,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<MessageRecord> for MessageView {
    fn from(record: MessageRecord) -> Self {
        let role = match record.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };

        Self {
            id: record.id,
            role: role.to_string(),
            content: record.content,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ThreadDetail {
    pub thread: ThreadSummary,
    pub messages: Vec<MessageView>,
}

/// Open a new conversation thread and make it active
#[utoipa::path(
    post,
    path = "/threads",
    request_body = CreateThreadRequest,
    responses(
        (status = 201, description = "Thread created", body = ThreadSummary)
    ),
    tag = "lesenne"
)]
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateThreadRequest>,
) -> ApiResult<(StatusCode, Json<ThreadSummary>)> {
    let mut memory = state.memory.lock().await;
    let thread_id = memory.create_thread(req.title).await?;

    let record = state
        .store
        .get_thread(&thread_id)
        .await?
        .ok_or_else(|| ApiError::ThreadNotFound(thread_id))?;

    Ok((StatusCode::CREATED, Json(record.into())))
}

/// List all threads, most recently updated first
#[utoipa::path(
    get,
    path = "/threads",
    responses(
        (status = 200, description = "Thread metadata rows", body = [ThreadSummary])
    ),
    tag = "lesenne"
)]
pub async fn list_threads(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ThreadSummary>>> {
    let records = state.store.list_threads().await?;
    Ok(Json(records.into_iter().map(ThreadSummary::from).collect()))
}

/// Fetch one thread with its full transcript in chronological order
#[utoipa::path(
    get,
    path = "/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread identifier")
    ),
    responses(
        (status = 200, description = "Thread with transcript", body = ThreadDetail),
        (status = 404, description = "Thread not found")
    ),
    tag = "lesenne"
)]
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<ThreadDetail>> {
    let record = state
        .store
        .get_thread(&thread_id)
        .await?
        .ok_or_else(|| ApiError::ThreadNotFound(thread_id.clone()))?;

    let messages = state.store.get_messages(&thread_id).await?;

    Ok(Json(ThreadDetail {
        thread: record.into(),
        messages: messages.into_iter().map(MessageView::from).collect(),
    }))
}

/// Empty a thread's transcript while keeping the thread itself
#[utoipa::path(
    post,
    path = "/threads/{thread_id}/clear",
    params(
        ("thread_id" = String, Path, description = "Thread identifier")
    ),
    responses(
        (status = 204, description = "Transcript cleared"),
        (status = 404, description = "Thread not found")
    ),
    tag = "lesenne"
)]
pub async fn clear_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .store
        .get_thread(&thread_id)
        .await?
        .ok_or_else(|| ApiError::ThreadNotFound(thread_id.clone()))?;

    let mut memory = state.memory.lock().await;
    memory.clear(Some(&thread_id)).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a thread and everything persisted for it
#[utoipa::path(
    delete,
    path = "/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread identifier")
    ),
    responses(
        (status = 204, description = "Thread deleted"),
        (status = 404, description = "Thread not found")
    ),
    tag = "lesenne"
)]
pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .store
        .get_thread(&thread_id)
        .await?
        .ok_or_else(|| ApiError::ThreadNotFound(thread_id.clone()))?;

    let mut memory = state.memory.lock().await;
    memory.delete(&thread_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
