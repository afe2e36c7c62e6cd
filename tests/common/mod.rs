//! Shared test fixtures for the prices-api integration tests.
//!
//! Provides an in-memory service plus helpers for building upload archives
//! and reading download archives.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use prices_api::config::ENTRY_NAME;
use prices_api::{archive, AggregateScope, PriceRecord, PricesService};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const UPLOAD_HEADER_LINE: &str = "id,name,category,price,created_date";
pub const DOWNLOAD_HEADER_LINE: &str = "id,created_date,name,category,price";

/// Service backed by a private in-memory DuckDB database.
pub fn setup_service() -> PricesService {
    setup_service_with_scope(AggregateScope::Batch)
}

pub fn setup_service_with_scope(scope: AggregateScope) -> PricesService {
    PricesService::builder()
        .in_memory()
        .aggregate_scope(scope)
        .connect_attempts(1)
        .build()
        .unwrap()
}

/// Upload archive whose `data.csv` holds the upload header plus `rows`.
pub fn upload_archive(rows: &[&str]) -> Vec<u8> {
    let mut table = String::from(UPLOAD_HEADER_LINE);
    table.push('\n');
    for row in rows {
        table.push_str(row);
        table.push('\n');
    }
    archive::build_entry(ENTRY_NAME, table.as_bytes()).unwrap()
}

/// Archive with arbitrary entries, stored uncompressed.
pub fn zip_with_entries(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Text of the `data.csv` entry of a download archive.
pub fn read_table(archive_bytes: &[u8]) -> String {
    let bytes = archive::extract_entry(archive_bytes, ENTRY_NAME).unwrap();
    String::from_utf8(bytes).unwrap()
}

pub fn store_count(service: &PricesService) -> i64 {
    service.database().connect().unwrap().count().unwrap()
}

/// Every persisted record, sorted by id.
pub fn stored_records(service: &PricesService) -> Vec<PriceRecord> {
    let conn = service.database().connect().unwrap();
    let mut records = Vec::new();
    conn.query_all(|r| {
        records.push(r);
        Ok(())
    })
    .unwrap();
    records.sort_by_key(|r| r.id);
    records
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 0.005,
        "expected {expected}, got {actual}"
    );
}
