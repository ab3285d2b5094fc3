use axum::extract::State;
use axum::Json;
use lesenne_types::{ProcessingStage, StageEvent};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

/// Snapshot of the stage tracker for the active request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProgressResponse {
    #[schema(value_type = String)]
    pub stage: ProcessingStage,
    /// French display label for the current stage
    pub label: String,
    /// Fraction of the request already completed, in [0, 1]
    pub progress: Option<f32>,
    #[schema(value_type = Vec<String>)]
    pub completed: Vec<ProcessingStage>,
}

/// Poll the progress of the request currently in flight
#[utoipa::path(
    get,
    path = "/progress",
    responses(
        (status = 200, description = "Current stage snapshot", body = ProgressResponse)
    ),
    tag = "lesenne"
)]
pub async fn get_progress(State(state): State<Arc<AppState>>) -> Json<ProgressResponse> {
    let stage = state.tracker.current_stage();
    let event = StageEvent::new(stage);

    Json(ProgressResponse {
        stage,
        label: stage.label().to_string(),
        progress: event.progress,
        completed: state.tracker.completed_stages(),
    })
}
