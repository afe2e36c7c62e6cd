use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use tracing::{error, warn};

use crate::error::PricesError;

/// Unified error type that renders as a JSON `{"error": "..."}` response
/// with an appropriate HTTP status code.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, "{}", self.message);
        } else {
            warn!(status = %self.status, "{}", self.message);
        }

        let mut response = (self.status, Json(json!({ "error": self.message }))).into_response();
        if self.status == StatusCode::METHOD_NOT_ALLOWED {
            response
                .headers_mut()
                .insert(header::ALLOW, header::HeaderValue::from_static("GET, POST"));
        }
        response
    }
}

impl From<PricesError> for AppError {
    fn from(e: PricesError) -> Self {
        let status = match &e {
            PricesError::InvalidArchive(_)
            | PricesError::EntryNotFound(_)
            | PricesError::MalformedTable(_)
            | PricesError::InvalidId(_)
            | PricesError::InvalidPrice(_) => StatusCode::BAD_REQUEST,
            PricesError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            PricesError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            PricesError::Persistence(_)
            | PricesError::Io(_)
            | PricesError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError::new(status, e.to_string())
    }
}
