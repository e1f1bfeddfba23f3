//! Writer and reader traits for plain-data streams.
//!
//! A [`Writer`] serializes a stream of plain-data items to a wire format; a
//! [`Reader`] parses a wire format back into a stream of raw plain-data
//! items. Neither knows about domain records: conversion happens in the
//! pipeline.
//!
//! Both traits are object-safe so that exporters and importers can hold them
//! as `Box<dyn Writer>` / `Box<dyn Reader>`.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::config::FormatOptions;
use crate::error::Result;
use crate::operation::ItemStream;
use crate::value::PlainData;

/// Lazy stream of raw items produced by a [`Reader`].
pub type RecordStream = ItemStream<PlainData>;

/// Serializes a stream of plain-data items.
///
/// Items are written as they are pulled from the input, so memory use does
/// not grow with the size of the export. The first error (from the input or
/// from the output) stops the export and is returned; the partial output
/// must then be considered invalid.
pub trait Writer: std::fmt::Debug {
    /// MIME type of the generated output.
    fn content_type(&self) -> &'static str;

    /// True if the output is not text.
    fn is_binary(&self) -> bool {
        false
    }

    /// Default output file name, e.g. `export.json`.
    fn default_filename(&self) -> &'static str;

    /// Formatting options this writer was built with.
    fn options(&self) -> FormatOptions;

    /// Same writer with different formatting options.
    fn with_options(&self, options: FormatOptions) -> Box<dyn Writer>;

    /// Write every item of `items` to `out` and flush it.
    ///
    /// Returns the number of items written.
    ///
    /// # Errors
    ///
    /// Returns the first error yielded by `items`, or
    /// [`DataError::WriteError`](crate::DataError::WriteError) if the output fails.
    fn export(
        &self,
        items: &mut dyn Iterator<Item = Result<PlainData>>,
        out: &mut dyn Write,
    ) -> Result<usize>;
}

/// Parses a wire format into a stream of raw plain-data items.
pub trait Reader: std::fmt::Debug {
    /// Stream the items contained in `input`.
    ///
    /// The stream owns `input` and releases it when dropped, whether it was
    /// fully consumed or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be opened as this format.
    /// Errors found later are yielded by the stream.
    fn read_from(&self, input: Box<dyn BufRead>) -> Result<RecordStream>;

    /// Stream the items contained in the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    fn records(&self, path: &Path) -> Result<RecordStream> {
        let file = File::open(path)?;
        self.read_from(Box::new(BufReader::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    /// Writes one item per line.
    #[derive(Debug)]
    struct LineWriter;

    impl Writer for LineWriter {
        fn content_type(&self) -> &'static str {
            "text/plain"
        }

        fn default_filename(&self) -> &'static str {
            "export.txt"
        }

        fn options(&self) -> FormatOptions {
            FormatOptions::default()
        }

        fn with_options(&self, _options: FormatOptions) -> Box<dyn Writer> {
            Box::new(LineWriter)
        }

        fn export(
            &self,
            items: &mut dyn Iterator<Item = Result<PlainData>>,
            out: &mut dyn Write,
        ) -> Result<usize> {
            let mut count = 0;
            for item in items {
                writeln!(out, "{}", item?).map_err(crate::DataError::WriteError)?;
                count += 1;
            }
            Ok(count)
        }
    }

    /// Reads one JSON value per line.
    #[derive(Debug)]
    struct LineReader;

    impl Reader for LineReader {
        fn read_from(&self, input: Box<dyn BufRead>) -> Result<RecordStream> {
            Ok(Box::new(input.lines().map(|line| -> Result<PlainData> {
                Ok(serde_json::from_str(&line?)?)
            })))
        }
    }

    #[test]
    fn test_writer_defaults() {
        let writer = LineWriter;
        assert!(!writer.is_binary());
        assert_eq!(writer.default_filename(), "export.txt");
    }

    #[test]
    fn test_writer_stops_on_input_error() {
        let mut items = vec![
            Ok(json!(1)),
            Err(crate::DataError::ConversionError("bad".to_string())),
            Ok(json!(2)),
        ]
        .into_iter();
        let mut out = Vec::new();
        assert!(LineWriter.export(&mut items, &mut out).is_err());
        assert_eq!(out, b"1\n");
    }

    #[test]
    fn test_reader_from_memory() {
        let input = Cursor::new(b"{\"a\":1}\n[2]\n".to_vec());
        let items: Vec<PlainData> = LineReader
            .read_from(Box::new(input))
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(items, vec![json!({"a": 1}), json!([2])]);
    }

    #[test]
    fn test_reader_missing_file_fails_fast() {
        let result = LineReader.records(Path::new("/nonexistent/records.txt"));
        assert!(matches!(result, Err(crate::DataError::IoError(_))));
    }
}
