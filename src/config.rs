use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PricesError;

pub const PRICES_ROUTE: &str = "/api/v0/prices";
pub const HEALTH_ROUTE: &str = "/health";

/// Name of the single CSV entry read from uploads and written to downloads.
pub const ENTRY_NAME: &str = "data.csv";
pub const RESPONSE_FILENAME: &str = "response.zip";

/// Multipart form field carrying the uploaded archive.
pub const UPLOAD_FIELD: &str = "file";

// Upload and download rows use different column orders.
pub const UPLOAD_HEADER: [&str; 5] = ["id", "name", "category", "price", "created_date"];
pub const DOWNLOAD_HEADER: [&str; 5] = ["id", "created_date", "name", "category", "price"];

/// Prices must stay below this bound to fit the store's `DECIMAL(18, 2)`
/// column.
pub const PRICE_LIMIT: f64 = 1e16;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 10;
pub const DEFAULT_CONNECT_BACKOFF: Duration = Duration::from_secs(2);

pub fn default_database_path() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("prices-api").join("prices.duckdb")
    } else {
        PathBuf::from(".prices-api").join("prices.duckdb")
    }
}

// ---------------------------------------------------------------------------
// AggregateScope
// ---------------------------------------------------------------------------

/// What an import summary describes.
///
/// `Batch` totals only the rows inserted by the import itself. `Store`
/// totals the whole `prices` table as seen by the import's transaction just
/// before it commits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateScope {
    #[default]
    Batch,
    Store,
}

impl fmt::Display for AggregateScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateScope::Batch => f.write_str("batch"),
            AggregateScope::Store => f.write_str("store"),
        }
    }
}

impl FromStr for AggregateScope {
    type Err = PricesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batch" => Ok(AggregateScope::Batch),
            "store" => Ok(AggregateScope::Store),
            other => Err(PricesError::Internal(format!(
                "unknown aggregate scope '{other}' (expected 'batch' or 'store')"
            ))),
        }
    }
}
