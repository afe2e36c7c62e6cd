//! Archive-to-store import.

use tracing::{info, warn};

use crate::archive;
use crate::config::{AggregateScope, ENTRY_NAME};
use crate::error::{PricesError, Result};
use crate::models::ImportSummary;
use crate::store::{Database, ImportTransaction};
use crate::table::TableReader;
use crate::validate;

// ---------------------------------------------------------------------------
// PriceImport
// ---------------------------------------------------------------------------

/// Imports one uploaded archive inside a single transaction.
pub struct PriceImport<'a> {
    db: &'a Database,
    scope: AggregateScope,
    max_archive_size: Option<usize>,
}

impl<'a> PriceImport<'a> {
    pub fn new(db: &'a Database, scope: AggregateScope, max_archive_size: Option<usize>) -> Self {
        Self {
            db,
            scope,
            max_archive_size,
        }
    }

    /// Import the `data.csv` entry of `archive`.
    ///
    /// Rows are validated and inserted one at a time. The first bad row,
    /// failed insert or unreadable line rolls back everything inserted so far
    /// and is returned as the error. An archive without a `data.csv` entry
    /// imports nothing and still succeeds.
    pub fn run(&self, archive: &[u8]) -> Result<ImportSummary> {
        if let Some(limit) = self.max_archive_size {
            if archive.len() > limit {
                return Err(PricesError::PayloadTooLarge {
                    size: archive.len(),
                    limit,
                });
            }
        }

        let table = match archive::extract_entry(archive, ENTRY_NAME) {
            Ok(bytes) => Some(bytes),
            Err(PricesError::EntryNotFound(name)) => {
                info!(entry = %name, "archive has no table entry, nothing to import");
                None
            }
            Err(e) => return Err(e),
        };

        let mut reader = table.as_deref().map(TableReader::new);
        if let Some(reader) = reader.as_mut() {
            reader.parse_header()?;
        }

        let mut conn = self.db.connect()?;
        let mut tx = conn.begin_import(self.scope)?;

        if let Some(reader) = reader.as_mut() {
            if let Err(e) = insert_rows(reader, &mut tx) {
                let inserted = tx.inserted();
                if let Err(rollback_err) = tx.rollback() {
                    warn!(error = %rollback_err, "rollback failed");
                }
                warn!(inserted, error = %e, "import rolled back");
                return Err(e);
            }
        }

        let summary = tx.commit()?;
        info!(
            scope = %self.scope,
            items = summary.total_items,
            categories = summary.total_categories,
            total_price = summary.total_price,
            "import committed"
        );
        Ok(summary)
    }
}

fn insert_rows(reader: &mut TableReader<'_>, tx: &mut ImportTransaction<'_>) -> Result<()> {
    while let Some(fields) = reader.parse_row()? {
        let record = validate::to_record(&fields)?;
        tx.insert(&record)?;
    }
    Ok(())
}
