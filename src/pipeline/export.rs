//! Store-to-archive export.

use tracing::info;

use crate::archive;
use crate::config::{DOWNLOAD_HEADER, ENTRY_NAME};
use crate::error::Result;
use crate::store::Database;
use crate::table::TableWriter;

// ---------------------------------------------------------------------------
// PriceExport
// ---------------------------------------------------------------------------

/// Packs every persisted record into a `data.csv` archive.
pub struct PriceExport<'a> {
    db: &'a Database,
}

impl<'a> PriceExport<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Build the download archive: the download header followed by one line
    /// per record, in whatever order the store returns them.
    pub fn run(&self) -> Result<Vec<u8>> {
        let conn = self.db.connect()?;

        let mut writer = TableWriter::in_memory();
        writer.write_header(DOWNLOAD_HEADER)?;
        conn.query_all(|record| writer.write_row(record.download_fields()))?;

        let rows = writer.rows();
        let table = writer.finish()?;
        let archive = archive::build_entry(ENTRY_NAME, &table)?;

        info!(rows, bytes = archive.len(), "export archive built");
        Ok(archive)
    }
}
