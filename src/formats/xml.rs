//! XML export format.
//!
//! [`XmlWriter`] writes:
//!
//! ```text
//! <?xml version="1.0" encoding="utf-8" standalone="yes"?>
//! <records><record>...</record>...</records>
//! ```
//!
//! Inside a `<record>`, each item is mapped recursively:
//!
//! | Plain data            | XML                                   |
//! |-----------------------|---------------------------------------|
//! | mapping key `k`       | element `<k>` holding the value       |
//! | sequence element      | element `<item>`                      |
//! | integer key `2019`    | element `<item>`                      |
//! | scalar                | text content                          |
//! | empty value           | empty element `<k/>`                  |
//!
//! Empty values are written as empty elements even when cleanup did not run
//! upstream. Booleans are written as `true`/`false`.
//!
//! [`XmlReader`] maps such a document back to plain data. XML has no types,
//! so every scalar comes back as a string and every empty element as `""`.
//! An element whose children are all `<item>` becomes a sequence, so the
//! round-trip is lossy for a mapping whose only key is `item` (`{"item": "x"}`
//! reads back as `["x"]`) and for integer keys (`{"2019": "x"}` also reads
//! back as `["x"]`).

use std::io::{BufRead, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Reader as XmlEventReader;
use quick_xml::Writer as XmlEventWriter;
use tracing::debug;

use super::traits::{Reader, RecordStream, Writer};
use crate::config::FormatOptions;
use crate::error::{DataError, Result};
use crate::value::{is_empty_value, Mapping, PlainData};

const ROOT: &str = "records";
const RECORD: &str = "record";
const ITEM: &str = "item";

/// True if `name` can be used as an XML element name.
///
/// Namespaced names (with `:`) are rejected.
#[must_use]
pub fn is_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {},
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// True for positional keys such as `"2019"` or `"-1"`, written as `<item>`.
fn is_integer_key(key: &str) -> bool {
    let digits = key.strip_prefix('-').unwrap_or(key);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Streaming `<records>` writer.
#[derive(Debug, Clone, Default)]
pub struct XmlWriter {
    options: FormatOptions,
}

impl XmlWriter {
    /// Compact writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer with explicit options. The indent applies in pretty mode only.
    #[must_use]
    pub fn with_format(options: FormatOptions) -> Self {
        XmlWriter { options }
    }
}

type EventWriter<'a> = XmlEventWriter<&'a mut dyn Write>;

fn emit(xml: &mut EventWriter<'_>, event: Event<'_>) -> Result<()> {
    xml.write_event(event).map_err(DataError::from_xml_write)
}

fn scalar_text(value: &PlainData) -> String {
    match value {
        PlainData::String(s) => s.clone(),
        PlainData::Null => String::new(),
        other => other.to_string(),
    }
}

/// Write the children (or text) of an element holding `value`.
fn write_content(xml: &mut EventWriter<'_>, value: &PlainData) -> Result<()> {
    match value {
        PlainData::Object(map) => {
            for (key, child) in map {
                let name = if is_integer_key(key) { ITEM } else { key.as_str() };
                write_element(xml, name, child)?;
            }
            Ok(())
        },
        PlainData::Array(items) => {
            for child in items {
                write_element(xml, ITEM, child)?;
            }
            Ok(())
        },
        scalar => emit(xml, Event::Text(BytesText::new(&scalar_text(scalar)))),
    }
}

fn write_element(xml: &mut EventWriter<'_>, name: &str, value: &PlainData) -> Result<()> {
    if !is_element_name(name) {
        return Err(DataError::ConversionError(format!(
            "'{name}' is not a valid XML element name"
        )));
    }
    if is_empty_value(value) {
        return emit(xml, Event::Empty(BytesStart::new(name)));
    }
    emit(xml, Event::Start(BytesStart::new(name)))?;
    write_content(xml, value)?;
    emit(xml, Event::End(BytesEnd::new(name)))
}

impl Writer for XmlWriter {
    fn content_type(&self) -> &'static str {
        "application/xml; charset=utf-8"
    }

    fn default_filename(&self) -> &'static str {
        "export.xml"
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
        let indent = self.options.effective_indent();
        let mut xml: EventWriter<'_> = if indent > 0 {
            XmlEventWriter::new_with_indent(&mut *out, b' ', indent)
        } else {
            XmlEventWriter::new(&mut *out)
        };

        emit(
            &mut xml,
            Event::Decl(BytesDecl::new("1.0", Some("utf-8"), Some("yes"))),
        )?;
        emit(&mut xml, Event::Start(BytesStart::new(ROOT)))?;

        let mut count = 0;
        for item in items {
            write_element(&mut xml, RECORD, &item?)?;
            count += 1;
        }

        emit(&mut xml, Event::End(BytesEnd::new(ROOT)))?;
        xml.into_inner().flush().map_err(DataError::WriteError)?;

        debug!(records = count, indent, "XML export written");
        Ok(count)
    }
}

/// Streaming reader for documents produced by [`XmlWriter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlReader;

impl XmlReader {
    /// Create a reader.
    #[must_use]
    pub fn new() -> Self {
        XmlReader
    }
}

impl Reader for XmlReader {
    fn read_from(&self, input: Box<dyn BufRead>) -> Result<RecordStream> {
        Ok(Box::new(XmlRecords {
            reader: XmlEventReader::from_reader(input),
            buf: Vec::new(),
            in_root: false,
            done: false,
        }))
    }
}

/// An element being parsed.
#[derive(Debug, Default)]
struct Frame {
    name: String,
    children: Vec<(String, PlainData)>,
    text: String,
}

impl Frame {
    fn new(name: String) -> Self {
        Frame {
            name,
            ..Self::default()
        }
    }

    fn into_value(self) -> Result<PlainData> {
        if self.children.is_empty() {
            return Ok(PlainData::String(self.text));
        }
        if self.children.iter().all(|(name, _)| name == ITEM) {
            return Ok(PlainData::Array(
                self.children.into_iter().map(|(_, value)| value).collect(),
            ));
        }
        let mut map = Mapping::new();
        for (name, value) in self.children {
            if map.contains_key(&name) {
                return Err(DataError::ParseError(format!(
                    "duplicate element <{name}> in <{}>",
                    self.name
                )));
            }
            map.insert(name, value);
        }
        Ok(PlainData::Object(map))
    }

    fn into_record(self) -> Result<PlainData> {
        if self.children.is_empty() && self.text.trim().is_empty() {
            return Ok(PlainData::Object(Mapping::new()));
        }
        self.into_value()
    }
}

/// Owned summary of one XML event.
enum Token {
    Start(String),
    Empty(String),
    End,
    Text(String),
    Eof,
    Other,
}

fn element_name(start: &BytesStart<'_>) -> Result<String> {
    std::str::from_utf8(start.name().as_ref())
        .map(str::to_string)
        .map_err(|e| DataError::ParseError(format!("invalid element name: {e}")))
}

fn parse_error(error: &quick_xml::Error) -> DataError {
    DataError::ParseError(format!("malformed XML: {error}"))
}

struct XmlRecords {
    reader: XmlEventReader<Box<dyn BufRead>>,
    buf: Vec<u8>,
    in_root: bool,
    done: bool,
}

impl XmlRecords {
    fn next_token(&mut self) -> Result<Token> {
        self.buf.clear();
        let token = match self.reader.read_event_into(&mut self.buf) {
            Ok(Event::Start(e)) => Token::Start(element_name(&e)?),
            Ok(Event::Empty(e)) => Token::Empty(element_name(&e)?),
            Ok(Event::End(_)) => Token::End,
            Ok(Event::Text(e)) => Token::Text(e.unescape().map_err(|e| parse_error(&e))?.into_owned()),
            Ok(Event::CData(e)) => Token::Text(
                String::from_utf8(e.into_inner().into_owned())
                    .map_err(|e| DataError::ParseError(format!("invalid CDATA: {e}")))?,
            ),
            Ok(Event::Eof) => Token::Eof,
            Ok(_) => Token::Other,
            Err(e) => return Err(parse_error(&e)),
        };
        Ok(token)
    }

    fn unexpected(name: &str, context: &str) -> DataError {
        DataError::ParseError(format!("unexpected element <{name}> {context}"))
    }

    fn next_record(&mut self) -> Result<Option<PlainData>> {
        let mut stack: Vec<Frame> = Vec::new();
        loop {
            let token = self.next_token()?;
            if let Some(top) = stack.last_mut() {
                match token {
                    Token::Start(name) => stack.push(Frame::new(name)),
                    Token::Empty(name) => top.children.push((name, PlainData::String(String::new()))),
                    Token::Text(text) => top.text.push_str(&text),
                    Token::End => {
                        let frame = stack.pop().ok_or_else(|| {
                            DataError::ParseError("unbalanced XML end tag".to_string())
                        })?;
                        match stack.last_mut() {
                            Some(parent) => {
                                let name = frame.name.clone();
                                parent.children.push((name, frame.into_value()?));
                            },
                            None => return frame.into_record().map(Some),
                        }
                    },
                    Token::Eof => {
                        return Err(DataError::ParseError(
                            "unexpected end of XML inside a record".to_string(),
                        ))
                    },
                    Token::Other => {},
                }
                continue;
            }

            match token {
                Token::Start(name) if !self.in_root => {
                    if name != ROOT {
                        return Err(Self::unexpected(&name, "at document root"));
                    }
                    self.in_root = true;
                },
                Token::Empty(name) if !self.in_root => {
                    if name != ROOT {
                        return Err(Self::unexpected(&name, "at document root"));
                    }
                    return Ok(None);
                },
                Token::Start(name) => {
                    if name != RECORD {
                        return Err(Self::unexpected(&name, "in <records>"));
                    }
                    stack.push(Frame::new(name));
                },
                Token::Empty(name) => {
                    if name != RECORD {
                        return Err(Self::unexpected(&name, "in <records>"));
                    }
                    return Ok(Some(PlainData::Object(Mapping::new())));
                },
                Token::End => return Ok(None),
                Token::Eof => {
                    return Err(DataError::ParseError(if self.in_root {
                        "unexpected end of XML, missing </records>".to_string()
                    } else {
                        "no <records> element found".to_string()
                    }))
                },
                Token::Text(_) | Token::Other => {},
            }
        }
    }
}

impl Iterator for XmlRecords {
    type Item = Result<PlainData>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            },
            Err(e) => {
                self.done = true;
                Some(Err(e))
            },
        }
    }
}
