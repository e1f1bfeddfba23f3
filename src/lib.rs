#![warn(missing_docs)]

//! # Docalist Data: record export and import pipelines
//!
//! Streams domain records through composable operations and serializes them
//! to JSON or XML, or reads those files back into records.
//!
//! An [`Exporter`] converts each record to plain data, cleans it (empty
//! elements removed, empty records dropped, top-level keys sorted) and
//! writes it. An [`Importer`] reads raw items, converts each one into zero,
//! one or several records, and yields them lazily.
//!
//! ## Quick Start
//!
//! ### Exporting Records
//!
//! ```
//! use docalist_data::{DataRecord, Registry};
//! use serde_json::json;
//!
//! let registry = Registry::with_defaults();
//! let exporter = registry.exporter("docalist-json")?;
//!
//! let records = vec![
//!     DataRecord::new("book").with_field("title", json!("Dune")).with_field("notes", json!([""])),
//! ];
//! let mut out = Vec::new();
//! exporter.export(&records, &mut out)?;
//! assert_eq!(out, br#"[{"title":"Dune"}]"#);
//! # Ok::<(), docalist_data::DataError>(())
//! ```
//!
//! ### Importing Records
//!
//! ```
//! use docalist_data::{Importer, Record};
//! use std::io::Cursor;
//!
//! let input = Cursor::new(r#"[{"type": "book", "title": "Dune"}]"#);
//! for record in Importer::json().records_from(Box::new(input))? {
//!     assert_eq!(record?.kind(), "book");
//! }
//! # Ok::<(), docalist_data::DataError>(())
//! ```
//!
//! ### Adding a Stage
//!
//! ```
//! use docalist_data::{Exporter, FnOperation, Outcome, PlainData};
//! use serde_json::json;
//!
//! let mut exporter = Exporter::json();
//! exporter.pipeline_mut().prepend(FnOperation::new("drafts", |item: PlainData| {
//!     Ok(if item["draft"] == json!(true) { Outcome::Dropped } else { Outcome::Kept(item) })
//! }));
//! # Ok::<(), docalist_data::DataError>(())
//! ```
//!
//! ## Modules
//!
//! - [`operation`]: the `Operation` trait and its `Outcome`
//! - [`pipeline`]: ordered, lazy composition of operations
//! - [`cleanup`]: empty-value pruning and key sorting
//! - [`converter`]: record to plain data, and back with fan-out
//! - [`formats`]: JSON and XML writers and readers
//! - [`exporter`], [`importer`]: named assemblies for one format
//! - [`registry`]: ID to exporter/importer lookup
//! - [`error`]: error types and result type

pub mod cleanup;
pub mod config;
pub mod converter;
pub mod error;
pub mod exporter;
/// JSON and XML support with unified Reader/Writer traits.
///
/// See the [`formats`] module documentation for details on supported formats
/// and how to use format-agnostic code.
pub mod formats;
pub mod importer;
pub mod logging;
pub mod operation;
pub mod pipeline;
/// Domain records as seen by converters (`Record`, `DataRecord`)
pub mod record;
pub mod registry;
pub mod value;

pub use cleanup::{cleanup_pipeline, FilterEmpty, FilterEmptyElements, SortByKey};
pub use config::FormatOptions;
pub use converter::{
    Converter, ConverterSet, ImportConverter, StandardConverter, StandardImportConverter,
};
pub use error::{DataError, Result};
pub use exporter::Exporter;
pub use formats::{Format, Reader, Writer};
pub use importer::Importer;
pub use operation::{FnOperation, ItemStream, Operation, Outcome};
pub use pipeline::Pipeline;
pub use record::{DataRecord, Record};
pub use registry::Registry;
pub use value::{is_empty_value, Mapping, PlainData};
