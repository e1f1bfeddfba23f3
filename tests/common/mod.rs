//! Common test helpers and utilities shared across test suite.

#![allow(dead_code)]

use docalist_data::{DataRecord, PlainData, Record};
use serde_json::json;

/// Builds a record of `kind` from a JSON object literal.
///
/// Panics if `fields` is not an object.
pub fn make_record(kind: &str, fields: PlainData) -> DataRecord {
    match fields {
        PlainData::Object(map) => DataRecord::from_fields(kind, map),
        other => panic!("record fields must be an object, got {other}"),
    }
}

/// The three records used by the classification scenario: one with an empty
/// field, one entirely empty, one with an empty element in a list.
pub fn sample_records() -> Vec<DataRecord> {
    vec![
        make_record("article", json!({"title": "A", "tags": []})),
        make_record("article", json!({"title": "", "tags": []})),
        make_record("article", json!({"title": "B", "tags": ["x", ""]})),
    ]
}

/// A realistic bibliographic record with nested data and some empty values.
pub fn create_realistic_record(n: usize) -> DataRecord {
    make_record(
        "book",
        json!({
            "type": "book",
            "title": format!("Title {n}"),
            "Author": [
                {"name": "Herbert", "role": "aut"},
                {"name": "", "role": ""},
            ],
            "date": 1965 + (n % 50),
            "abstract": "",
            "topic": [
                {"type": "free", "term": ["sand", "spice", ""]},
                {"type": "mesh", "term": []},
            ],
            "extent": {"pages": 412, "volumes": null},
            "available": n % 2 == 0,
        }),
    )
}

/// `count` realistic records.
pub fn create_realistic_records(count: usize) -> Vec<DataRecord> {
    (0..count).map(create_realistic_record).collect()
}

/// Plain-data snapshots of `records`.
pub fn snapshots<R: Record>(records: &[R]) -> Vec<PlainData> {
    records.iter().map(Record::to_plain_data).collect()
}
