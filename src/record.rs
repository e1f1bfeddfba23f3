//! Domain records as seen by the export/import pipeline.
//!
//! The pipeline treats records as opaque: it only asks for a record's kind
//! (used to pick a converter) and for a plain-data snapshot. It never mutates
//! or persists a record.

use crate::value::{Mapping, PlainData};

/// An opaque domain entity that can produce a plain-data snapshot of itself.
pub trait Record {
    /// Kind of record (e.g. `"article"`, `"book"`), used by converter dispatch.
    fn kind(&self) -> &str;

    /// Returns a snapshot of the record's fields as plain data.
    ///
    /// The snapshot is a value: it holds no reference back to the record.
    fn to_plain_data(&self) -> PlainData;
}

impl<T: Record + ?Sized> Record for &T {
    fn kind(&self) -> &str {
        (**self).kind()
    }

    fn to_plain_data(&self) -> PlainData {
        (**self).to_plain_data()
    }
}

impl<T: Record + ?Sized> Record for Box<T> {
    fn kind(&self) -> &str {
        (**self).kind()
    }

    fn to_plain_data(&self) -> PlainData {
        (**self).to_plain_data()
    }
}

/// Generic record: a kind plus ordered fields.
///
/// This is the record type produced by the standard importer, and a
/// convenient way for a record store to hand data to an exporter.
///
/// # Examples
///
/// ```
/// use docalist_data::record::{DataRecord, Record};
/// use serde_json::json;
///
/// let record = DataRecord::new("article")
///     .with_field("title", json!("Rust in libraries"))
///     .with_field("tags", json!(["rust", "marc"]));
///
/// assert_eq!(record.kind(), "article");
/// assert_eq!(record.get("title"), Some(&json!("Rust in libraries")));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataRecord {
    kind: String,
    fields: Mapping,
}

impl DataRecord {
    /// Default kind given to imported records that do not declare one.
    pub const DEFAULT_KIND: &'static str = "record";

    /// Create an empty record of the given kind.
    pub fn new(kind: impl Into<String>) -> Self {
        DataRecord {
            kind: kind.into(),
            fields: Mapping::new(),
        }
    }

    /// Create a record from an existing mapping.
    pub fn from_fields(kind: impl Into<String>, fields: Mapping) -> Self {
        DataRecord {
            kind: kind.into(),
            fields,
        }
    }

    /// Builder-style field setter.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: PlainData) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field, replacing any previous value in place.
    pub fn set(&mut self, name: impl Into<String>, value: PlainData) {
        self.fields.insert(name.into(), value);
    }

    /// Get a field value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PlainData> {
        self.fields.get(name)
    }

    /// Fields in insertion order.
    #[must_use]
    pub fn fields(&self) -> &Mapping {
        &self.fields
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Record for DataRecord {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn to_plain_data(&self) -> PlainData {
        PlainData::Object(self.fields.clone())
    }
}
