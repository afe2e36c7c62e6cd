//! Bulk import and export of price records over HTTP.
//!
//! Uploads are ZIP archives holding a single `data.csv`; every row is
//! validated and inserted inside one DuckDB transaction, and the caller gets
//! back an [`ImportSummary`]. Downloads run the same path backwards: every
//! stored record is written to `data.csv` and packed into a fresh archive.
//!
//! # Quick start
//!
//! ```no_run
//! use prices_api::PricesService;
//!
//! let service = PricesService::builder().in_memory().build().unwrap();
//!
//! # let upload: Vec<u8> = Vec::new();
//! let summary = service.imports().run(&upload).unwrap();
//! println!("imported {} items", summary.total_items);
//!
//! let archive = service.exports().run().unwrap();
//! ```

pub mod archive;
#[cfg(feature = "async")]
pub mod async_service;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
#[cfg(feature = "server")]
pub mod server;
pub mod store;
pub mod table;
pub mod validate;

#[cfg(feature = "async")]
pub use async_service::AsyncPricesService;
pub use config::AggregateScope;
pub use error::{PricesError, Result};
pub use models::{ImportSummary, PriceRecord};
pub use store::Database;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// PricesServiceBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`PricesService`].
///
/// Use [`PricesService::builder()`] to obtain one.
#[derive(Debug, Clone)]
pub struct PricesServiceBuilder {
    database_path: Option<PathBuf>,
    in_memory: bool,
    max_archive_size: Option<usize>,
    aggregate_scope: AggregateScope,
    connect_attempts: u32,
    connect_backoff: Duration,
}

impl Default for PricesServiceBuilder {
    fn default() -> Self {
        Self {
            database_path: None,
            in_memory: false,
            max_archive_size: None,
            aggregate_scope: AggregateScope::default(),
            connect_attempts: config::DEFAULT_CONNECT_ATTEMPTS,
            connect_backoff: config::DEFAULT_CONNECT_BACKOFF,
        }
    }
}

impl PricesServiceBuilder {
    /// Set the DuckDB database file.
    ///
    /// If not set, the platform data directory is used (e.g.
    /// `~/.local/share/prices-api/prices.duckdb` on Linux).
    pub fn database_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database_path = Some(path.as_ref().to_path_buf());
        self.in_memory = false;
        self
    }

    /// Keep all data in memory for the lifetime of the service.
    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    /// Reject uploaded archives larger than `bytes`. Unlimited by default.
    pub fn max_archive_size(mut self, bytes: Option<usize>) -> Self {
        self.max_archive_size = bytes;
        self
    }

    /// Choose what import summaries describe. Defaults to
    /// [`AggregateScope::Batch`].
    pub fn aggregate_scope(mut self, scope: AggregateScope) -> Self {
        self.aggregate_scope = scope;
        self
    }

    /// How many times to try opening the store before giving up. Defaults
    /// to 10.
    pub fn connect_attempts(mut self, attempts: u32) -> Self {
        self.connect_attempts = attempts;
        self
    }

    /// Wait between failed open attempts. Defaults to 2 seconds.
    pub fn connect_backoff(mut self, backoff: Duration) -> Self {
        self.connect_backoff = backoff;
        self
    }

    /// Open the store (retrying as configured) and build the service.
    pub fn build(self) -> Result<PricesService> {
        let path = if self.in_memory {
            None
        } else {
            Some(self.database_path.unwrap_or_else(config::default_database_path))
        };
        let db = Database::open_with_retry(
            path.as_deref(),
            self.connect_attempts,
            self.connect_backoff,
        )?;
        Ok(PricesService {
            db,
            aggregate_scope: self.aggregate_scope,
            max_archive_size: self.max_archive_size,
        })
    }
}

// ---------------------------------------------------------------------------
// PricesService
// ---------------------------------------------------------------------------

/// Owns the price store and hands out import and export jobs.
///
/// The service is `Sync`; share one instance (e.g. behind an `Arc`) across
/// every request for the lifetime of the process.
pub struct PricesService {
    db: Database,
    aggregate_scope: AggregateScope,
    max_archive_size: Option<usize>,
}

impl PricesService {
    pub fn builder() -> PricesServiceBuilder {
        PricesServiceBuilder::default()
    }

    /// Wrap an already opened database with default import settings.
    pub fn with_database(db: Database) -> Self {
        Self {
            db,
            aggregate_scope: AggregateScope::default(),
            max_archive_size: None,
        }
    }

    /// Access the import job for uploaded archives.
    pub fn imports(&self) -> pipeline::PriceImport<'_> {
        pipeline::PriceImport::new(&self.db, self.aggregate_scope, self.max_archive_size)
    }

    /// Access the export job that builds download archives.
    pub fn exports(&self) -> pipeline::PriceExport<'_> {
        pipeline::PriceExport::new(&self.db)
    }

    /// Check that the store answers queries.
    pub fn ping(&self) -> Result<()> {
        self.db.ping()
    }

    pub fn aggregate_scope(&self) -> AggregateScope {
        self.aggregate_scope
    }

    pub fn max_archive_size(&self) -> Option<usize> {
        self.max_archive_size
    }

    /// Return a reference to the underlying [`Database`].
    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl fmt::Display for PricesService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PricesService(database={}, aggregate_scope={}, max_archive_size={})",
            self.db.location(),
            self.aggregate_scope,
            self.max_archive_size
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unlimited".to_string())
        )
    }
}
