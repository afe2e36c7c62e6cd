#[derive(Debug, thiserror::Error)]
pub enum PricesError {
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    #[error("Entry not found in archive: {0}")]
    EntryNotFound(String),

    #[error("Malformed table: {0}")]
    MalformedTable(String),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] duckdb::Error),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Archive of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, PricesError>;
