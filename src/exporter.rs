//! Exporters: converter + cleanup pipeline + writer.
//!
//! `export(records)` is `writer.export(pipeline.process(convert(records)))`.
//! Each record is converted by the first converter supporting its kind,
//! then goes through the cleanup stages in order (empty-element filtering,
//! empty-record filtering, key sorting) and is written as soon as it leaves
//! the pipeline.
//!
//! # Examples
//!
//! ```
//! use docalist_data::exporter::Exporter;
//! use docalist_data::record::DataRecord;
//! use serde_json::json;
//!
//! let records = vec![
//!     DataRecord::new("article").with_field("title", json!("A")).with_field("tags", json!([])),
//!     DataRecord::new("article").with_field("title", json!("")),
//!     DataRecord::new("article").with_field("title", json!("B")).with_field("tags", json!(["x", ""])),
//! ];
//!
//! let mut out = Vec::new();
//! let count = Exporter::json().export(&records, &mut out)?;
//!
//! assert_eq!(count, 2);
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     r#"[{"title":"A"},{"tags":["x"],"title":"B"}]"#
//! );
//! # Ok::<(), docalist_data::DataError>(())
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::cleanup::cleanup_pipeline;
use crate::config::FormatOptions;
use crate::converter::{ConverterSet, StandardConverter};
use crate::error::{DataError, Result};
use crate::formats::{Format, Writer};
use crate::pipeline::Pipeline;
use crate::record::Record;
use crate::value::PlainData;

/// ID of the compact JSON exporter.
pub const JSON: &str = "docalist-json";
/// ID of the pretty JSON exporter.
pub const JSON_PRETTY: &str = "docalist-json-pretty";
/// ID of the compact XML exporter.
pub const XML: &str = "docalist-xml";
/// ID of the pretty XML exporter.
pub const XML_PRETTY: &str = "docalist-xml-pretty";

/// A named assembly exporting records to one file format.
#[derive(Debug)]
pub struct Exporter {
    id: String,
    label: String,
    description: String,
    converters: ConverterSet,
    pipeline: Pipeline<PlainData>,
    writer: Box<dyn Writer>,
}

impl Exporter {
    /// Exporter with the standard converter and the cleanup pipeline.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
        writer: Box<dyn Writer>,
    ) -> Self {
        Exporter {
            id: id.into(),
            label: label.into(),
            description: description.into(),
            converters: ConverterSet::single(StandardConverter::new()),
            pipeline: cleanup_pipeline(),
            writer,
        }
    }

    /// Compact JSON exporter (`docalist-json`).
    #[must_use]
    pub fn json() -> Self {
        Self::new(
            JSON,
            "Docalist JSON",
            "Records as a JSON array, empty fields removed.",
            Format::Json.writer(),
        )
    }

    /// Indented JSON exporter (`docalist-json-pretty`).
    #[must_use]
    pub fn json_pretty() -> Self {
        Self::json().into_pretty(
            JSON_PRETTY,
            "Docalist JSON (formatted)",
            "Records as an indented JSON array, empty fields removed.",
        )
    }

    /// Compact XML exporter (`docalist-xml`).
    #[must_use]
    pub fn xml() -> Self {
        Self::new(
            XML,
            "Docalist XML",
            "Records as an XML document, empty fields removed.",
            Format::Xml.writer(),
        )
    }

    /// Indented XML exporter (`docalist-xml-pretty`).
    #[must_use]
    pub fn xml_pretty() -> Self {
        Self::xml()
            .into_pretty(
                XML_PRETTY,
                "Docalist XML (formatted)",
                "Records as an indented XML document, empty fields removed.",
            )
            .with_writer_options(FormatOptions::pretty().with_indent(2))
    }

    /// Same converters and pipeline under a new identity, with the writer
    /// switched to pretty output.
    #[must_use]
    pub fn into_pretty(
        self,
        id: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let options = self.writer.options().with_pretty(true);
        self.with_identity(id, label, description)
            .with_writer_options(options)
    }

    /// Replace ID, label and description.
    #[must_use]
    pub fn with_identity(
        mut self,
        id: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.id = id.into();
        self.label = label.into();
        self.description = description.into();
        self
    }

    /// Replace the writer's formatting options, keeping its format.
    #[must_use]
    pub fn with_writer_options(mut self, options: FormatOptions) -> Self {
        self.writer = self.writer.with_options(options);
        self
    }

    /// Replace the converters.
    #[must_use]
    pub fn with_converters(mut self, converters: ConverterSet) -> Self {
        self.converters = converters;
        self
    }

    /// Replace the pipeline run after conversion.
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: Pipeline<PlainData>) -> Self {
        self.pipeline = pipeline;
        self
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

    /// MIME type of the output.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        self.writer.content_type()
    }

    /// True if the output is not text.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.writer.is_binary()
    }

    /// Suggested output file name: `{id}-{writer default filename}`.
    #[must_use]
    pub fn suggested_filename(&self) -> String {
        format!("{}-{}", self.id, self.writer.default_filename())
    }

    /// The writer.
    #[must_use]
    pub fn writer(&self) -> &dyn Writer {
        self.writer.as_ref()
    }

    /// Converters used to turn records into plain data.
    #[must_use]
    pub fn converters(&self) -> &ConverterSet {
        &self.converters
    }

    /// Mutable access to the converters.
    pub fn converters_mut(&mut self) -> &mut ConverterSet {
        &mut self.converters
    }

    /// Pipeline run after conversion.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline<PlainData> {
        &self.pipeline
    }

    /// Mutable access to the pipeline, e.g. to add or replace a stage.
    pub fn pipeline_mut(&mut self) -> &mut Pipeline<PlainData> {
        &mut self.pipeline
    }

    /// True if some converter supports records of `kind`.
    #[must_use]
    pub fn supports(&self, kind: &str) -> bool {
        self.converters.supports(kind)
    }

    /// Lazily convert and clean `records` without writing them.
    pub fn process<'a, I, R>(&'a self, records: I) -> impl Iterator<Item = Result<PlainData>> + 'a
    where
        I: IntoIterator<Item = R> + 'a,
        I::IntoIter: 'a,
        R: Record + 'a,
    {
        let converted = records
            .into_iter()
            .map(move |record| self.converters.convert(&record));
        self.pipeline.process_results(converted)
    }

    /// Export `records` to `out`. Returns the number of records written.
    ///
    /// # Errors
    ///
    /// Returns the first conversion, pipeline or write error. The output is
    /// then incomplete and must be discarded.
    pub fn export<I, R>(&self, records: I, out: &mut dyn Write) -> Result<usize>
    where
        I: IntoIterator<Item = R>,
        R: Record,
    {
        info!(exporter = %self.id, "export started");
        let mut items = self.process(records);
        let count = self.writer.export(&mut items, out)?;
        info!(exporter = %self.id, records = count, "export finished");
        Ok(count)
    }

    /// Export `records` to a new file at `path`.
    ///
    /// The file is removed if the export fails.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidConfiguration`] if the file cannot be
    /// created, otherwise the errors of [`export`](Self::export).
    pub fn export_to_file<I, R>(&self, records: I, path: &Path) -> Result<usize>
    where
        I: IntoIterator<Item = R>,
        R: Record,
    {
        let file = File::create(path).map_err(|e| {
            DataError::InvalidConfiguration(format!("cannot create {}: {e}", path.display()))
        })?;
        let mut out = BufWriter::new(file);
        let result = self.export(records, &mut out);
        drop(out);
        if result.is_err() {
            warn!(exporter = %self.id, path = %path.display(), "export failed, removing partial output");
            if let Err(e) = fs::remove_file(path) {
                warn!(path = %path.display(), error = %e, "could not remove partial output");
            }
        }
        result
    }
}
