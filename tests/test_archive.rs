//! Archive codec tests: entry lookup, malformed input, packaging.

mod common;

use prices_api::archive::{build_entry, extract_entry};
use prices_api::PricesError;

#[test]
fn extract_returns_decompressed_entry() {
    let content = b"id,name\n1,Milk\n".repeat(100);
    let archive = build_entry("data.csv", &content).unwrap();
    assert!(archive.len() < content.len(), "entry should be compressed");

    assert_eq!(extract_entry(&archive, "data.csv").unwrap(), content);
}

#[test]
fn extract_picks_named_entry_among_others() {
    let archive = common::zip_with_entries(&[
        ("readme.txt", b"ignore me".as_slice()),
        ("data.csv", b"a\n1\n".as_slice()),
        ("other.csv", b"b\n2\n".as_slice()),
    ]);
    assert_eq!(extract_entry(&archive, "data.csv").unwrap(), b"a\n1\n");
}

#[test]
fn extract_reports_missing_entry() {
    let archive = common::zip_with_entries(&[("prices.csv", b"a\n".as_slice())]);
    let err = extract_entry(&archive, "data.csv").unwrap_err();
    assert!(matches!(err, PricesError::EntryNotFound(ref name) if name == "data.csv"));
}

#[test]
fn extract_rejects_non_archive_bytes() {
    let err = extract_entry(b"definitely not a zip file", "data.csv").unwrap_err();
    assert!(matches!(err, PricesError::InvalidArchive(_)));

    let err = extract_entry(&[], "data.csv").unwrap_err();
    assert!(matches!(err, PricesError::InvalidArchive(_)));
}

#[test]
fn truncated_archive_is_invalid() {
    let archive = build_entry("data.csv", b"id\n1\n".as_slice()).unwrap();
    let err = extract_entry(&archive[..archive.len() / 2], "data.csv").unwrap_err();
    assert!(matches!(err, PricesError::InvalidArchive(_)));
}

#[test]
fn empty_entry_round_trips() {
    let archive = build_entry("data.csv", b"".as_slice()).unwrap();
    assert!(extract_entry(&archive, "data.csv").unwrap().is_empty());
}
