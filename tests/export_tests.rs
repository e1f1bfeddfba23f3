//! End-to-end export tests through the public API.

mod common;

use std::io::{self, Write};

use common::{create_realistic_record, create_realistic_records, make_record, sample_records};
use docalist_data::{
    ConverterSet, DataError, DataRecord, Exporter, PlainData, Registry, StandardConverter,
};
use serde_json::json;

fn export(exporter: &Exporter, records: &[DataRecord]) -> String {
    let mut out = Vec::new();
    exporter.export(records, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_classification_scenario_json() {
    assert_eq!(
        export(&Exporter::json(), &sample_records()),
        r#"[{"title":"A"},{"tags":["x"],"title":"B"}]"#
    );
}

#[test]
fn test_realistic_record_json() {
    let out = export(&Exporter::json(), &[create_realistic_record(0)]);
    assert_eq!(
        out,
        concat!(
            r#"[{"Author":[{"name":"Herbert","role":"aut"}],"available":true,"date":1965,"#,
            r#""extent":{"pages":412},"title":"Title 0","#,
            r#""topic":[{"type":"free","term":["sand","spice"]},{"type":"mesh"}],"type":"book"}]"#
        )
    );
}

#[test]
fn test_realistic_record_xml() {
    let out = export(&Exporter::xml(), &[create_realistic_record(0)]);
    assert!(out.starts_with(r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>"#));
    assert!(out.ends_with(concat!(
        "<records><record>",
        "<Author><item><name>Herbert</name><role>aut</role></item></Author>",
        "<available>true</available>",
        "<date>1965</date>",
        "<extent><pages>412</pages></extent>",
        "<title>Title 0</title>",
        "<topic><item><type>free</type><term><item>sand</item><item>spice</item></term></item>",
        "<item><type>mesh</type></item></topic>",
        "<type>book</type>",
        "</record></records>",
    )));
}

#[test]
fn test_no_records_gives_empty_document() {
    assert_eq!(export(&Exporter::json(), &[]), "[]");
    assert_eq!(export(&Exporter::json_pretty(), &[]), "[]");
    assert!(export(&Exporter::xml(), &[]).ends_with("<records></records>"));
}

#[test]
fn test_pretty_and_compact_json_hold_the_same_data() {
    let records = create_realistic_records(5);
    let compact: PlainData = serde_json::from_str(&export(&Exporter::json(), &records)).unwrap();
    let pretty_text = export(&Exporter::json_pretty(), &records);
    let pretty: PlainData = serde_json::from_str(&pretty_text).unwrap();

    assert_eq!(compact, pretty);
    assert!(pretty_text.starts_with("[\n{\n    \"Author\""));
    assert_eq!(compact.as_array().map(Vec::len), Some(5));
}

#[test]
fn test_pretty_xml_is_indented() {
    let out = export(&Exporter::xml_pretty(), &[make_record("a", json!({"t": "x"}))]);
    assert!(out.contains("\n<records>\n  <record>\n    <t>x</t>\n  </record>\n</records>"));
}

#[test]
fn test_unicode_is_written_unescaped() {
    let records = [make_record("a", json!({"title": "Été / 東京"}))];
    assert_eq!(export(&Exporter::json(), &records), r#"[{"title":"Été / 東京"}]"#);
    assert!(export(&Exporter::xml(), &records).contains("<title>Été / 東京</title>"));
}

#[test]
fn test_export_is_streamed() {
    let records = (0..10_000).map(create_realistic_record);
    let count = Exporter::json().export(records, &mut io::sink()).unwrap();
    assert_eq!(count, 10_000);
}

/// Output failing after `limit` bytes.
struct ShortOutput {
    written: usize,
    limit: usize,
}

impl Write for ShortOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written + buf.len() > self.limit {
            return Err(io::Error::other("disk full"));
        }
        self.written += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_output_failure_is_a_write_error() {
    for exporter in [Exporter::json(), Exporter::xml()] {
        let mut out = ShortOutput {
            written: 0,
            limit: 64,
        };
        let err = exporter
            .export(create_realistic_records(100), &mut out)
            .unwrap_err();
        assert!(
            matches!(err, DataError::WriteError(_)),
            "{}: {err:?}",
            exporter.id()
        );
    }
}

#[test]
fn test_unsupported_record_aborts_export() {
    let exporter = Exporter::json()
        .with_converters(ConverterSet::single(StandardConverter::for_kinds(["book"])));
    let records = vec![
        make_record("book", json!({"t": 1})),
        make_record("video", json!({"t": 2})),
        make_record("book", json!({"t": 3})),
    ];
    let mut out = Vec::new();
    let err = exporter.export(&records, &mut out).unwrap_err();
    assert!(matches!(err, DataError::UnsupportedRecord { ref kind } if kind == "video"));
}

#[test]
fn test_every_registered_exporter_writes_its_content_type() {
    let registry = Registry::with_defaults();
    for exporter in registry.exporters() {
        let out = export(&exporter, &sample_records());
        if exporter.content_type().starts_with("application/json") {
            let value: PlainData = serde_json::from_str(&out).unwrap();
            assert_eq!(value.as_array().map(Vec::len), Some(2), "{}", exporter.id());
        } else {
            assert_eq!(out.matches("<record>").count(), 2, "{}", exporter.id());
        }
        assert!(exporter.suggested_filename().starts_with(exporter.id()));
    }
}
