use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("storage error: {0}")]
    Storage(#[from] depot::Error),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ServerError::Storage(depot::Error::NotFound(key)) => {
                (StatusCode::NOT_FOUND, json!({ "key": key }))
            }
            ServerError::Storage(depot::Error::AttachmentNotFound(digest)) => {
                (StatusCode::NOT_FOUND, json!({ "digest": digest }))
            }
            ServerError::Storage(depot::Error::Validation(e)) => {
                (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() }))
            }
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ServerError::Storage(depot::Error::StorageUnavailable(e)) => {
                warn!(error = %e, "storage unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "error": "storage unavailable" }),
                )
            }
            ServerError::Config(_) | ServerError::Io(_) | ServerError::Internal(_) => {
                warn!(error = %self, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
