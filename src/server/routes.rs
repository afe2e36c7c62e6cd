use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{header, Method};
use axum::response::{IntoResponse, Json, Response};
use tracing::{debug, info};

use crate::config::{PRICES_ROUTE, RESPONSE_FILENAME, UPLOAD_FIELD};
use crate::error::PricesError;
use crate::server::error::AppError;
use crate::server::state::AppState;

/// POST | GET /api/v0/prices
///
/// POST imports the multipart `file` archive and answers with the import
/// summary. GET answers with the download archive. Any other method is
/// refused before the request body is touched.
pub async fn prices(
    State(state): State<Arc<AppState>>,
    method: Method,
    request: Request,
) -> Result<Response, AppError> {
    info!(%method, "request on {PRICES_ROUTE}");

    match method {
        Method::POST => upload(&state, request).await,
        Method::GET => download(&state).await,
        other => Err(PricesError::MethodNotAllowed(other.to_string()).into()),
    }
}

/// GET /health
///
/// `OK` when the store answers a trivial query.
pub async fn health(State(state): State<Arc<AppState>>) -> Result<&'static str, AppError> {
    state.service.ping().await?;
    Ok("OK")
}

async fn upload(state: &AppState, request: Request) -> Result<Response, AppError> {
    let archive = read_upload(request).await?;
    let summary = state.service.import(archive).await?;
    Ok(Json(summary).into_response())
}

async fn download(state: &AppState) -> Result<Response, AppError> {
    let archive = state.service.export().await?;
    let headers = [
        (header::CONTENT_TYPE, "application/zip".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={RESPONSE_FILENAME}"),
        ),
    ];
    Ok((headers, archive).into_response())
}

/// Pull the archive bytes out of the `file` form field.
async fn read_upload(request: Request) -> Result<Vec<u8>, AppError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| AppError::bad_request(format!("Failed to read file: {e}")))?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let bytes = field.bytes().await.map_err(multipart_error)?;
        debug!(bytes = bytes.len(), "upload received");
        return Ok(bytes.to_vec());
    }

    Err(AppError::bad_request(format!(
        "Failed to read file: missing form field '{UPLOAD_FIELD}'"
    )))
}

fn multipart_error(e: MultipartError) -> AppError {
    AppError::new(e.status(), format!("Failed to read file: {}", e.body_text()))
}
