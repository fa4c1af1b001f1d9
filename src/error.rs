use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::db::store::StoreError;
use crate::services::dispatcher::DispatchError;
use crate::services::queue::QueueError;
use crate::services::sports_db::SportsDataError;

const SERVICE_UNAVAILABLE_MESSAGE: &str = "The prediction service is temporarily unavailable, please try again";

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Upstream(#[from] SportsDataError),
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Validation(msg) => ApiError::Validation(msg),
            DispatchError::Store(e) => ApiError::Store(e),
            DispatchError::Queue(e) => ApiError::Queue(e),
        }
    }
}

impl From<garde::Report> for ApiError {
    fn from(report: garde::Report) -> Self {
        ApiError::Validation(report.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
            ApiError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Store(e) => {
                tracing::error!(error = %e, "Storage failure while handling request");
                json_error(StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", SERVICE_UNAVAILABLE_MESSAGE)
            }
            ApiError::Queue(e) => {
                tracing::error!(error = %e, "Queue failure while handling request");
                json_error(StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", SERVICE_UNAVAILABLE_MESSAGE)
            }
            ApiError::Upstream(e) => {
                tracing::warn!(error = %e, "Sports data request failed");
                json_error(StatusCode::BAD_GATEWAY, "upstream_error", "Could not load match data, please try again")
            }
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
