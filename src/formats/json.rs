//! JSON export format.
//!
//! [`JsonWriter`] writes a single JSON array, one element per item, emitted
//! as the items arrive. Forward slashes and non-ASCII text are written
//! literally (UTF-8), never escaped.
//!
//! ```text
//! compact: [{"title":"A"},{"title":"B"}]
//! pretty:  [
//!          {
//!              "title": "A"
//!          },
//!          {
//!              "title": "B"
//!          }
//!          ]
//! ```
//!
//! [`JsonReader`] reads such an array back one element at a time, so only
//! the current element is held in memory.
//!
//! # Examples
//!
//! ```
//! use docalist_data::formats::{JsonWriter, Writer};
//! use serde_json::json;
//!
//! let mut items = vec![Ok(json!({"url": "http://example.org/é"}))].into_iter();
//! let mut out = Vec::new();
//! JsonWriter::new().export(&mut items, &mut out)?;
//! assert_eq!(String::from_utf8(out).unwrap(), r#"[{"url":"http://example.org/é"}]"#);
//! # Ok::<(), docalist_data::DataError>(())
//! ```

use std::io::{self, BufRead, Write};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::debug;

use super::traits::{Reader, RecordStream, Writer};
use crate::config::FormatOptions;
use crate::error::{DataError, Result};
use crate::value::PlainData;

/// Streaming JSON array writer.
#[derive(Debug, Clone, Default)]
pub struct JsonWriter {
    options: FormatOptions,
}

impl JsonWriter {
    /// Compact writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer with explicit options.
    #[must_use]
    pub fn with_format(options: FormatOptions) -> Self {
        JsonWriter { options }
    }

    fn write_item(&self, item: &PlainData, out: &mut dyn Write) -> Result<()> {
        let result = if self.options.pretty {
            let indent = vec![b' '; self.options.indent];
            let mut serializer =
                serde_json::Serializer::with_formatter(&mut *out, PrettyFormatter::with_indent(&indent));
            item.serialize(&mut serializer)
        } else {
            serde_json::to_writer(&mut *out, item)
        };
        result.map_err(|e| {
            if e.is_io() {
                DataError::WriteError(e.into())
            } else {
                DataError::JsonError(e)
            }
        })
    }
}

fn write_all(out: &mut dyn Write, bytes: &[u8]) -> Result<()> {
    out.write_all(bytes).map_err(DataError::WriteError)
}

impl Writer for JsonWriter {
    fn content_type(&self) -> &'static str {
        "application/json; charset=utf-8"
    }

    fn default_filename(&self) -> &'static str {
        "export.json"
    }

    fn options(&self) -> FormatOptions {
        self.options
    }

    fn with_options(&self, options: FormatOptions) -> Box<dyn Writer> {
        Box::new(Self::with_format(options))
    }

    fn export(
        &self,
        items: &mut dyn Iterator<Item = Result<PlainData>>,
        out: &mut dyn Write,
    ) -> Result<usize> {
        let separator: &[u8] = if self.options.pretty { b",\n" } else { b"," };

        write_all(out, b"[")?;
        let mut count = 0;
        for item in items {
            let item = item?;
            if count > 0 {
                write_all(out, separator)?;
            } else if self.options.pretty {
                write_all(out, b"\n")?;
            }
            self.write_item(&item, out)?;
            count += 1;
        }
        if self.options.pretty && count > 0 {
            write_all(out, b"\n")?;
        }
        write_all(out, b"]")?;
        out.flush().map_err(DataError::WriteError)?;

        debug!(records = count, pretty = self.options.pretty, "JSON export written");
        Ok(count)
    }
}

/// Streaming reader for JSON arrays produced by [`JsonWriter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReader;

impl JsonReader {
    /// Create a reader.
    #[must_use]
    pub fn new() -> Self {
        JsonReader
    }
}

impl Reader for JsonReader {
    fn read_from(&self, input: Box<dyn BufRead>) -> Result<RecordStream> {
        Ok(Box::new(JsonElements::new(input)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the opening `[`.
    Start,
    /// After `[`, before the first element.
    First,
    /// After an element.
    Next,
    Done,
}

/// Splits a JSON array into its top-level elements.
struct JsonElements<R> {
    bytes: io::Bytes<R>,
    peeked: Option<u8>,
    state: State,
    read: usize,
}

impl<R: BufRead> JsonElements<R> {
    fn new(input: R) -> Self {
        JsonElements {
            bytes: input.bytes(),
            peeked: None,
            state: State::Start,
            read: 0,
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        if let Some(byte) = self.peeked.take() {
            return Ok(Some(byte));
        }
        self.bytes.next().transpose().map_err(DataError::IoError)
    }

    fn next_significant(&mut self) -> Result<Option<u8>> {
        loop {
            match self.next_byte()? {
                Some(byte) if byte.is_ascii_whitespace() => {},
                other => return Ok(other),
            }
        }
    }

    fn required_byte(&mut self) -> Result<u8> {
        self.next_byte()?
            .ok_or_else(|| DataError::ParseError("unexpected end of JSON array".to_string()))
    }

    /// Collect the raw bytes of one element starting with `first`.
    fn element_bytes(&mut self, first: u8) -> Result<Vec<u8>> {
        let mut buf = vec![first];
        match first {
            b'{' | b'[' => {
                let mut depth = 1usize;
                let mut in_string = false;
                let mut escaped = false;
                while depth > 0 {
                    let byte = self.required_byte()?;
                    buf.push(byte);
                    if in_string {
                        if escaped {
                            escaped = false;
                        } else if byte == b'\\' {
                            escaped = true;
                        } else if byte == b'"' {
                            in_string = false;
                        }
                    } else {
                        match byte {
                            b'"' => in_string = true,
                            b'{' | b'[' => depth += 1,
                            b'}' | b']' => depth -= 1,
                            _ => {},
                        }
                    }
                }
            },
            b'"' => {
                let mut escaped = false;
                loop {
                    let byte = self.required_byte()?;
                    buf.push(byte);
                    if escaped {
                        escaped = false;
                    } else if byte == b'\\' {
                        escaped = true;
                    } else if byte == b'"' {
                        break;
                    }
                }
            },
            _ => loop {
                match self.next_byte()? {
                    Some(byte) if byte == b',' || byte == b']' || byte.is_ascii_whitespace() => {
                        self.peeked = Some(byte);
                        break;
                    },
                    Some(byte) => buf.push(byte),
                    None => break,
                }
            },
        }
        Ok(buf)
    }

    fn parse_element(&mut self, first: u8) -> Result<Option<PlainData>> {
        let bytes = self.element_bytes(first)?;
        self.read += 1;
        self.state = State::Next;
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| DataError::ParseError(format!("JSON element {}: {e}", self.read)))
    }

    fn next_element(&mut self) -> Result<Option<PlainData>> {
        loop {
            match self.state {
                State::Start => match self.next_significant()? {
                    Some(b'[') => self.state = State::First,
                    Some(byte) => {
                        return Err(DataError::ParseError(format!(
                            "expected '[' at start of JSON input, found '{}'",
                            char::from(byte)
                        )))
                    },
                    None => {
                        return Err(DataError::ParseError(
                            "empty input, expected a JSON array".to_string(),
                        ))
                    },
                },
                State::First => {
                    return match self.next_significant()? {
                        Some(b']') => {
                            self.state = State::Done;
                            Ok(None)
                        },
                        Some(byte) => self.parse_element(byte),
                        None => Err(DataError::ParseError(
                            "unexpected end of JSON array".to_string(),
                        )),
                    }
                },
                State::Next => {
                    return match self.next_significant()? {
                        Some(b']') => {
                            self.state = State::Done;
                            Ok(None)
                        },
                        Some(b',') => {
                            let first = self.next_significant()?.ok_or_else(|| {
                                DataError::ParseError("unexpected end of JSON array".to_string())
                            })?;
                            self.parse_element(first)
                        },
                        Some(byte) => Err(DataError::ParseError(format!(
                            "expected ',' or ']' after JSON element {}, found '{}'",
                            self.read,
                            char::from(byte)
                        ))),
                        None => Err(DataError::ParseError(
                            "unexpected end of JSON array".to_string(),
                        )),
                    }
                },
                State::Done => return Ok(None),
            }
        }
    }
}

impl<R: BufRead> Iterator for JsonElements<R> {
    type Item = Result<PlainData>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_element() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => None,
            Err(e) => {
                self.state = State::Done;
                Some(Err(e))
            },
        }
    }
}
