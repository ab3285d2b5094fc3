use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lesenne_memory::MemoryError;
use lesenne_persist::StoreError;
use lesenne_pipeline::PipelineError;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("thread not found: {0}")]
    ThreadNotFound(String),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ThreadNotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(StoreError::ThreadNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Memory(MemoryError::Storage(StoreError::ThreadNotFound(_))) => {
                StatusCode::NOT_FOUND
            }
            Self::Memory(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // Upstream dependencies failed, not this service
            Self::Pipeline(PipelineError::Retrieval(_)) => StatusCode::BAD_GATEWAY,
            Self::Pipeline(PipelineError::Generation(_)) => StatusCode::BAD_GATEWAY,
            Self::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = Json(serde_json::json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_maps_to_400() {
        assert_eq!(
            ApiError::BadRequest("empty question".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn missing_thread_maps_to_404() {
        assert_eq!(
            ApiError::ThreadNotFound("abc".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Storage(StoreError::ThreadNotFound("abc".into())).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn upstream_failures_map_to_502() {
        let error = ApiError::Pipeline(PipelineError::Generation(anyhow::anyhow!("down")));
        assert_eq!(error.status(), StatusCode::BAD_GATEWAY);
    }
}
