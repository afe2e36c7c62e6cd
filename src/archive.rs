//! ZIP archive codec for uploads and downloads.
//!
//! Archives are handled entirely in memory: uploads arrive as a byte buffer
//! and downloads are produced as one.

use std::io::{Cursor, Read, Write};

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{PricesError, Result};

/// Return the decompressed bytes of the entry named `entry_name`.
///
/// Fails with [`PricesError::InvalidArchive`] when `archive` is not a
/// readable ZIP and with [`PricesError::EntryNotFound`] when no entry has
/// exactly that name.
pub fn extract_entry(archive: &[u8], entry_name: &str) -> Result<Vec<u8>> {
    let mut zip = ZipArchive::new(Cursor::new(archive))
        .map_err(|e| PricesError::InvalidArchive(e.to_string()))?;

    let mut entry = match zip.by_name(entry_name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(PricesError::EntryNotFound(entry_name.to_string()))
        }
        Err(e) => return Err(PricesError::InvalidArchive(e.to_string())),
    };

    let mut content = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut content)
        .map_err(|e| PricesError::InvalidArchive(format!("{entry_name}: {e}")))?;
    Ok(content)
}

/// Build a new archive holding exactly one deflate-compressed entry.
pub fn build_entry(entry_name: &str, content: &[u8]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(entry_name, options)
        .map_err(|e| PricesError::Internal(format!("failed to start archive entry: {e}")))?;
    zip.write_all(content)?;

    let cursor = zip
        .finish()
        .map_err(|e| PricesError::Internal(format!("failed to finish archive: {e}")))?;
    Ok(cursor.into_inner())
}
