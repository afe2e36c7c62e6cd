//! HTTP surface: route registration and request handlers.

pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{any, get};
use axum::Router;

use crate::async_service::AsyncPricesService;
use crate::config::{HEALTH_ROUTE, PRICES_ROUTE};

pub use error::AppError;
pub use state::AppState;

/// Room left for multipart boundaries and part headers on top of the
/// configured archive limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the application router around a shared service.
///
/// `/api/v0/prices` takes every method and dispatches on it itself, so that
/// unsupported methods get the same JSON error body as every other failure.
pub fn router(service: AsyncPricesService) -> Router {
    let body_limit = match service.service().max_archive_size() {
        Some(limit) => DefaultBodyLimit::max(limit.saturating_add(MULTIPART_OVERHEAD)),
        None => DefaultBodyLimit::disable(),
    };

    let state = Arc::new(AppState { service });

    Router::new()
        .route(PRICES_ROUTE, any(routes::prices))
        .route(HEALTH_ROUTE, get(routes::health))
        .layer(body_limit)
        .with_state(state)
}
