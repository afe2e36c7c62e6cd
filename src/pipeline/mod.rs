//! Import and export jobs.
//!
//! Each job borrows the [`Database`](crate::store::Database) and runs
//! synchronously on the calling thread. The HTTP layer moves them onto the
//! blocking pool.

pub mod export;
pub mod import;

pub use export::PriceExport;
pub use import::PriceImport;
