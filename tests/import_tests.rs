//! Import tests, including file round-trips through every standard format.

mod common;

use std::io::Cursor;

use common::{create_realistic_records, make_record, sample_records};
use docalist_data::logging::init_test_logging;
use docalist_data::{
    DataError, DataRecord, Exporter, ImportConverter, Importer, Outcome, PlainData, Record,
    Registry, Result,
};
use serde_json::json;

fn titles(records: &[DataRecord]) -> Vec<Option<String>> {
    records
        .iter()
        .map(|r| r.get("title").and_then(PlainData::as_str).map(str::to_string))
        .collect()
}

#[test]
fn test_json_file_round_trip_preserves_data() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let source = create_realistic_records(20);

    for id in ["docalist-json", "docalist-json-pretty"] {
        let exporter = Registry::with_defaults().exporter(id).unwrap();
        let path = dir.path().join(exporter.suggested_filename());
        exporter.export_to_file(&source, &path).unwrap();

        let expected: Vec<PlainData> = exporter.process(&source).collect::<Result<_>>().unwrap();
        let importer = Importer::json();
        let imported: Vec<DataRecord> = importer.records(&path).unwrap().collect::<Result<_>>().unwrap();

        assert_eq!(imported.len(), 20, "{id}");
        for (record, expected) in imported.iter().zip(&expected) {
            assert_eq!(record.kind(), "book");
            assert_eq!(&record.to_plain_data(), expected);
        }
    }
}

#[test]
fn test_xml_file_round_trip_keeps_structure() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let source = create_realistic_records(3);

    for id in ["docalist-xml", "docalist-xml-pretty"] {
        let exporter = Registry::with_defaults().exporter(id).unwrap();
        let path = dir.path().join(exporter.suggested_filename());
        assert_eq!(exporter.export_to_file(&source, &path).unwrap(), 3);

        let importer = Importer::xml();
        let imported: Vec<DataRecord> = importer.records(&path).unwrap().collect::<Result<_>>().unwrap();

        assert_eq!(titles(&imported), vec![
            Some("Title 0".to_string()),
            Some("Title 1".to_string()),
            Some("Title 2".to_string()),
        ]);
        assert_eq!(
            imported[1].to_plain_data(),
            json!({
                "Author": [{"name": "Herbert", "role": "aut"}],
                "available": "false",
                "date": "1966",
                "extent": {"pages": "412"},
                "title": "Title 1",
                "topic": [{"type": "free", "term": ["sand", "spice"]}, {"type": "mesh"}],
                "type": "book",
            }),
            "{id}"
        );
    }
}

#[test]
fn test_classification_scenario_round_trip() {
    let mut out = Vec::new();
    Exporter::json().export(&sample_records(), &mut out).unwrap();
    let imported: Vec<DataRecord> = Importer::json()
        .records_from(Box::new(Cursor::new(out)))
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(titles(&imported), vec![Some("A".to_string()), Some("B".to_string())]);
    assert_eq!(imported[1].get("tags"), Some(&json!(["x"])));
}

#[test]
fn test_import_is_lazy() {
    let importer = Importer::json();
    let mut records = importer
        .records_from(Box::new(Cursor::new(r#"[{"title": "A"}, {"title": "B"}, not json"#)))
        .unwrap();
    assert_eq!(records.next().unwrap().unwrap().get("title"), Some(&json!("A")));
    assert!(records.next().unwrap().is_ok());
    assert!(matches!(records.next(), Some(Err(DataError::ParseError(_)))));
    assert!(records.next().is_none());
}

#[test]
fn test_early_drop_releases_input() {
    let importer = Importer::json();
    let first = importer
        .records_from(Box::new(Cursor::new(r#"[{"title": "A"}, {"title": "B"}]"#)))
        .unwrap()
        .next();
    assert!(first.is_some());
}

#[test]
fn test_malformed_xml_is_a_parse_error() {
    let importer = Importer::xml();
    let result: Result<Vec<DataRecord>> = importer
        .records_from(Box::new(Cursor::new("<records><record><a>1</b></record>")))
        .unwrap()
        .collect();
    assert!(matches!(result, Err(DataError::ParseError(_))));
}

/// Splits a `"parts"` list into one record per part, tagged with its parent.
/// An item without parts yields nothing.
#[derive(Debug)]
struct SplitParts;

impl ImportConverter<DataRecord> for SplitParts {
    fn convert(&self, data: PlainData) -> Result<Outcome<DataRecord>> {
        let parent = data["id"].clone();
        if !data.is_object() {
            return Err(DataError::ConversionError("expected an object".to_string()));
        }
        let parts = data
            .get("parts")
            .and_then(PlainData::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(Outcome::many(parts.into_iter().map(move |part| {
            make_record("part", json!({"parent": parent.clone(), "name": part}))
        })))
    }
}

#[test]
fn test_custom_converter_fans_out_in_order() {
    let importer = Importer::json().with_converter(Box::new(SplitParts));
    let input = r#"[{"id": 1, "parts": ["a", "b"]}, {"id": 2, "parts": []}, {"id": 3, "parts": ["c"]}]"#;
    let records: Vec<DataRecord> = importer
        .records_from(Box::new(Cursor::new(input)))
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();

    let names: Vec<_> = records.iter().map(|r| r.get("name").cloned()).collect();
    assert_eq!(names, vec![Some(json!("a")), Some(json!("b")), Some(json!("c"))]);
    assert_eq!(records[2].get("parent"), Some(&json!(3)));
    assert!(records.iter().all(|r| r.kind() == "part"));
}

#[test]
fn test_registry_importers_match_exporters() {
    let registry = Registry::with_defaults();
    let records = vec![make_record("note", json!({"type": "note", "title": "T"}))];
    for id in registry.importer_ids() {
        let mut out = Vec::new();
        registry.exporter(id).unwrap().export(&records, &mut out).unwrap();
        let importer = registry.importer(id).unwrap();
        let imported: Vec<DataRecord> = importer
            .records_from(Box::new(Cursor::new(out)))
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(imported.len(), 1, "{id}");
        assert_eq!(imported[0].kind(), "note", "{id}");
    }
}
