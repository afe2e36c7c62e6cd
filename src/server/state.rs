use crate::async_service::AsyncPricesService;

/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// The one store-backed service for the whole process. Blocking work is
    /// dispatched to the thread pool internally.
    pub service: AsyncPricesService,
}
