//! Error taxonomy shared by the service and the HTTP layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

// ---

/// Errors surfaced by the sensor record service and mapped onto HTTP status
/// codes by the routes.
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown sensor type in the request path. Rejected before any storage
    /// call is made.
    #[error("Invalid sensor type")]
    InvalidSensorType,

    /// The referenced record id does not exist.
    #[error("ID not found")]
    NotFound,

    /// Storage connectivity or execution failure. Retriable by the caller;
    /// never masked as `NotFound`.
    #[error("Storage unavailable")]
    Storage(#[from] sqlx::Error),
}

/// JSON error body, shaped like `{"error": "..."}`.
#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // ---
        let status = match &self {
            Error::InvalidSensorType | Error::NotFound => StatusCode::NOT_FOUND,
            Error::Storage(cause) => {
                // The cause stays in the logs; clients only see a generic
                // message.
                tracing::error!("storage error: {cause}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
