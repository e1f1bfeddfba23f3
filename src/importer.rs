//! Importers: reader + pipeline around a one-to-many converter.
//!
//! `records(path)` reads raw items with the [`Reader`], runs them through the
//! pre-conversion stages, converts each one into zero, one or several records
//! and runs those through the post-conversion stages. Fanned-out records are
//! spliced into the output in order. Everything is lazy: nothing is read
//! until the returned iterator is consumed.

use std::io::BufRead;
use std::iter;
use std::path::Path;

use tracing::info;

use crate::cleanup::FilterEmptyElements;
use crate::converter::{ImportConverter, StandardImportConverter};
use crate::error::Result;
use crate::formats::{Format, Reader};
use crate::operation::ItemStream;
use crate::pipeline::Pipeline;
use crate::record::DataRecord;
use crate::value::PlainData;

/// ID of the JSON importer.
pub const JSON: &str = "docalist-json";
/// ID of the XML importer.
pub const XML: &str = "docalist-xml";

/// A named assembly importing records of type `R` from one file format.
///
/// # Examples
///
/// ```
/// use docalist_data::importer::Importer;
/// use docalist_data::record::Record;
/// use std::io::Cursor;
///
/// let input = Cursor::new(r#"[{"type": "book", "title": "A", "note": ""}, [{"title": "B"}, {}]]"#);
/// let records = Importer::json()
///     .records_from(Box::new(input))?
///     .collect::<docalist_data::Result<Vec<_>>>()?;
///
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].kind(), "book");
/// assert_eq!(records[0].get("note"), None);
/// assert_eq!(records[1].kind(), "record");
/// # Ok::<(), docalist_data::DataError>(())
/// ```
#[derive(Debug)]
pub struct Importer<R = DataRecord> {
    id: String,
    label: String,
    description: String,
    reader: Box<dyn Reader>,
    pre: Pipeline<PlainData>,
    converter: Box<dyn ImportConverter<R>>,
    post: Pipeline<R>,
}

impl Importer<DataRecord> {
    /// JSON importer (`docalist-json`).
    #[must_use]
    pub fn json() -> Self {
        Self::standard(
            JSON,
            "Docalist JSON",
            "Records from a JSON array.",
            Format::Json,
        )
    }

    /// XML importer (`docalist-xml`).
    #[must_use]
    pub fn xml() -> Self {
        Self::standard(
            XML,
            "Docalist XML",
            "Records from a <records> XML document.",
            Format::Xml,
        )
    }

    /// Standard importer for `format`: empty elements are removed from the
    /// raw items before they become [`DataRecord`]s.
    fn standard(id: &str, label: &str, description: &str, format: Format) -> Self {
        let mut importer = Self::new(
            id,
            label,
            description,
            format.reader(),
            Box::new(StandardImportConverter::new()),
        );
        importer.pre.append(FilterEmptyElements);
        importer
    }
}

impl<R: 'static> Importer<R> {
    /// Importer with no stage besides the converter.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
        reader: Box<dyn Reader>,
        converter: Box<dyn ImportConverter<R>>,
    ) -> Self {
        Importer {
            id: id.into(),
            label: label.into(),
            description: description.into(),
            reader,
            pre: Pipeline::new(),
            converter,
            post: Pipeline::new(),
        }
    }

    /// Stable identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Human description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The reader.
    #[must_use]
    pub fn reader(&self) -> &dyn Reader {
        self.reader.as_ref()
    }

    /// Stages run on raw items, before conversion.
    #[must_use]
    pub fn pre_pipeline(&self) -> &Pipeline<PlainData> {
        &self.pre
    }

    /// Mutable access to the pre-conversion stages.
    pub fn pre_pipeline_mut(&mut self) -> &mut Pipeline<PlainData> {
        &mut self.pre
    }

    /// Stages run on converted records.
    #[must_use]
    pub fn post_pipeline(&self) -> &Pipeline<R> {
        &self.post
    }

    /// Mutable access to the post-conversion stages.
    pub fn post_pipeline_mut(&mut self) -> &mut Pipeline<R> {
        &mut self.post
    }

    /// Replace the converter.
    #[must_use]
    pub fn with_converter(mut self, converter: Box<dyn ImportConverter<R>>) -> Self {
        self.converter = converter;
        self
    }

    /// Lazily import the records of the file at `path`.
    ///
    /// # Errors
    ///
    /// Fails fast if the file cannot be opened. Errors found while reading or
    /// converting are yielded by the iterator, which then ends.
    pub fn records(&self, path: &Path) -> Result<impl Iterator<Item = Result<R>> + '_> {
        info!(importer = %self.id, path = %path.display(), "import started");
        let raw = self.reader.records(path)?;
        Ok(self.assemble(raw))
    }

    /// Lazily import the records read from `input`.
    ///
    /// # Errors
    ///
    /// Fails fast if `input` cannot be opened as this importer's format.
    pub fn records_from(
        &self,
        input: Box<dyn BufRead>,
    ) -> Result<impl Iterator<Item = Result<R>> + '_> {
        info!(importer = %self.id, "import started");
        let raw = self.reader.read_from(input)?;
        Ok(self.assemble(raw))
    }

    fn assemble(&self, raw: ItemStream<PlainData>) -> impl Iterator<Item = Result<R>> + '_ {
        let converted = self
            .pre
            .process_results(raw)
            .flat_map(move |item| -> ItemStream<R> {
                match item.and_then(|data| self.converter.convert(data)) {
                    Ok(outcome) => outcome.into_stream(),
                    Err(e) => Box::new(iter::once(Err(e))),
                }
            });
        self.post.process_results(converted)
    }
}
