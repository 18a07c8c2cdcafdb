use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::backend_client::BackendError;
use crate::matching::models::InputError;
use crate::matching::orchestrator::PreconditionError;
use crate::skills::allocator::AllocationError;
use crate::skills::draft::DraftError;
use crate::workflow::controller::WorkflowError;
use crate::workflow::navigation::UnknownPage;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The action cannot start in the current workflow state.
    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Backend error: {0}")]
    Backend(BackendError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Api {
                status: 404,
                message,
            } => AppError::NotFound(message),
            other => AppError::Backend(other),
        }
    }
}

impl From<AllocationError> for AppError {
    fn from(err: AllocationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<DraftError> for AppError {
    fn from(err: DraftError) -> Self {
        match err {
            DraftError::WrongStage => AppError::UnprocessableEntity(err.to_string()),
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl From<InputError> for AppError {
    fn from(err: InputError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<PreconditionError> for AppError {
    fn from(err: PreconditionError) -> Self {
        AppError::UnprocessableEntity(err.to_string())
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Precondition(e) => e.into(),
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl From<UnknownPage> for AppError {
    fn from(err: UnknownPage) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Backend(BackendError::Api { status, message }) if *status < 500 => {
                tracing::warn!("Backend rejected request ({status}): {message}");
                (StatusCode::BAD_REQUEST, "BACKEND_REJECTED", message.clone())
            }
            AppError::Backend(e) => {
                tracing::error!("Backend error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "BACKEND_ERROR",
                    "The matching backend is unavailable".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
