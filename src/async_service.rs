//! Async wrapper around [`PricesService`] for use in Tokio.
//!
//! Archive decoding, CSV parsing and DuckDB calls all block, so every
//! operation is dispatched to the blocking thread pool via
//! [`tokio::task::spawn_blocking`].
//!
//! # Example
//!
//! ```no_run
//! use prices_api::AsyncPricesService;
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = AsyncPricesService::builder()
//!         .in_memory()
//!         .build()
//!         .await
//!         .unwrap();
//!
//!     let archive = service.export().await.unwrap();
//!     let summary = service.import(archive).await.unwrap();
//!     assert_eq!(summary.total_items, 0);
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::AggregateScope;
use crate::error::{PricesError, Result};
use crate::models::ImportSummary;
use crate::{PricesService, PricesServiceBuilder};

// ---------------------------------------------------------------------------
// AsyncPricesServiceBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncPricesService`].
#[derive(Debug, Clone, Default)]
pub struct AsyncPricesServiceBuilder {
    inner: PricesServiceBuilder,
}

impl AsyncPricesServiceBuilder {
    pub fn database_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.inner = self.inner.database_path(path);
        self
    }

    pub fn in_memory(mut self) -> Self {
        self.inner = self.inner.in_memory();
        self
    }

    pub fn max_archive_size(mut self, bytes: Option<usize>) -> Self {
        self.inner = self.inner.max_archive_size(bytes);
        self
    }

    pub fn aggregate_scope(mut self, scope: AggregateScope) -> Self {
        self.inner = self.inner.aggregate_scope(scope);
        self
    }

    pub fn connect_attempts(mut self, attempts: u32) -> Self {
        self.inner = self.inner.connect_attempts(attempts);
        self
    }

    pub fn connect_backoff(mut self, backoff: Duration) -> Self {
        self.inner = self.inner.connect_backoff(backoff);
        self
    }

    /// Build the service on the blocking pool, so the open-retry loop never
    /// stalls the event loop.
    pub async fn build(self) -> Result<AsyncPricesService> {
        tokio::task::spawn_blocking(move || {
            let service = self.inner.build()?;
            Ok(AsyncPricesService::new(service))
        })
        .await
        .map_err(|e| PricesError::Internal(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncPricesService
// ---------------------------------------------------------------------------

/// Async wrapper around [`PricesService`].
///
/// Cheap to clone; all clones share the same store.
#[derive(Clone)]
pub struct AsyncPricesService {
    inner: Arc<PricesService>,
}

impl AsyncPricesService {
    pub fn builder() -> AsyncPricesServiceBuilder {
        AsyncPricesServiceBuilder::default()
    }

    pub fn new(service: PricesService) -> Self {
        Self {
            inner: Arc::new(service),
        }
    }

    /// Run a sync service operation on the blocking thread pool.
    ///
    /// Work handed to the pool runs to completion even if the awaiting
    /// future is dropped.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&PricesService) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let service = self.inner.clone();
        tokio::task::spawn_blocking(move || f(&service))
            .await
            .map_err(|e| PricesError::Internal(format!("Task join error: {e}")))?
    }

    /// Import an uploaded archive.
    pub async fn import(&self, archive: Vec<u8>) -> Result<ImportSummary> {
        self.run(move |s| s.imports().run(&archive)).await
    }

    /// Build the download archive.
    pub async fn export(&self) -> Result<Vec<u8>> {
        self.run(|s| s.exports().run()).await
    }

    pub async fn ping(&self) -> Result<()> {
        self.run(|s| s.ping()).await
    }

    /// Return a reference to the wrapped [`PricesService`].
    pub fn service(&self) -> &PricesService {
        &self.inner
    }

    /// On-disk database path, if any.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.inner.database().path()
    }
}
