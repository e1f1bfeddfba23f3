//! Converters between domain records and plain data.
//!
//! Export converters are one-to-one: a [`Record`] becomes one [`PlainData`]
//! item. Import converters are one-to-many: a raw item becomes zero, one or
//! several records.
//!
//! Converters do not filter. Empty-value pruning is left to the
//! [`cleanup`](crate::cleanup) operations.

use std::fmt;

use crate::error::{DataError, Result};
use crate::operation::Outcome;
use crate::record::{DataRecord, Record};
use crate::value::{is_empty_value, PlainData};

/// Converts a domain record into plain data for export.
pub trait Converter: fmt::Debug {
    /// True if this converter can handle records of `kind`.
    fn supports(&self, kind: &str) -> bool;

    /// Convert one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be converted.
    fn convert(&self, record: &dyn Record) -> Result<PlainData>;
}

/// Identity converter: returns the record's plain-data snapshot verbatim.
///
/// By default it supports every record kind; [`StandardConverter::for_kinds`]
/// restricts it to a fixed list.
#[derive(Debug, Clone, Default)]
pub struct StandardConverter {
    kinds: Option<Vec<String>>,
}

impl StandardConverter {
    /// Converter supporting every record kind.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Converter restricted to the given record kinds.
    pub fn for_kinds<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StandardConverter {
            kinds: Some(kinds.into_iter().map(Into::into).collect()),
        }
    }
}

impl Converter for StandardConverter {
    fn supports(&self, kind: &str) -> bool {
        self.kinds
            .as_ref()
            .map_or(true, |kinds| kinds.iter().any(|k| k == kind))
    }

    fn convert(&self, record: &dyn Record) -> Result<PlainData> {
        Ok(record.to_plain_data())
    }
}

/// Dispatches each record to the first registered converter supporting it.
#[derive(Debug, Default)]
pub struct ConverterSet {
    converters: Vec<Box<dyn Converter>>,
}

impl ConverterSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set holding a single converter.
    pub fn single(converter: impl Converter + 'static) -> Self {
        let mut set = Self::new();
        set.push(converter);
        set
    }

    /// Register a converter. Earlier converters take precedence.
    pub fn push(&mut self, converter: impl Converter + 'static) -> &mut Self {
        self.converters.push(Box::new(converter));
        self
    }

    /// Number of registered converters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// True if no converter is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// First converter supporting `kind`.
    #[must_use]
    pub fn find(&self, kind: &str) -> Option<&dyn Converter> {
        self.converters
            .iter()
            .find(|converter| converter.supports(kind))
            .map(|converter| converter.as_ref())
    }

    /// True if some converter supports `kind`.
    #[must_use]
    pub fn supports(&self, kind: &str) -> bool {
        self.find(kind).is_some()
    }

    /// Convert `record` with the first converter supporting its kind.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnsupportedRecord`] if no converter supports the
    /// record's kind, or the converter's own error.
    pub fn convert(&self, record: &dyn Record) -> Result<PlainData> {
        let kind = record.kind();
        self.find(kind)
            .ok_or_else(|| DataError::UnsupportedRecord {
                kind: kind.to_string(),
            })?
            .convert(record)
    }
}

/// Converts raw plain data into zero, one or many domain records.
pub trait ImportConverter<R>: fmt::Debug {
    /// Convert one raw item.
    ///
    /// # Errors
    ///
    /// Returns an error if the raw item cannot be mapped to records.
    fn convert(&self, data: PlainData) -> Result<Outcome<R>>;
}

/// Standard import converter producing [`DataRecord`]s.
///
/// - an empty item is dropped;
/// - a mapping becomes one record;
/// - a sequence fans out, each element converted in turn;
/// - a scalar is an error.
///
/// The record kind is read from a configurable field (`"type"` by default)
/// and falls back to [`DataRecord::DEFAULT_KIND`]. The kind field stays in
/// the record's fields.
#[derive(Debug, Clone)]
pub struct StandardImportConverter {
    kind_field: String,
}

impl Default for StandardImportConverter {
    fn default() -> Self {
        StandardImportConverter {
            kind_field: "type".to_string(),
        }
    }
}

impl StandardImportConverter {
    /// Converter reading the record kind from the `"type"` field.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the record kind from `field` instead.
    #[must_use]
    pub fn with_kind_field(mut self, field: impl Into<String>) -> Self {
        self.kind_field = field.into();
        self
    }

    fn to_record(kind_field: &str, data: PlainData) -> Result<Option<DataRecord>> {
        if is_empty_value(&data) {
            return Ok(None);
        }
        match data {
            PlainData::Object(fields) => {
                let kind = fields
                    .get(kind_field)
                    .and_then(PlainData::as_str)
                    .filter(|kind| !kind.is_empty())
                    .unwrap_or(DataRecord::DEFAULT_KIND)
                    .to_string();
                Ok(Some(DataRecord::from_fields(kind, fields)))
            },
            other => Err(DataError::ConversionError(format!(
                "expected a mapping for a record, got {other}"
            ))),
        }
    }
}

impl ImportConverter<DataRecord> for StandardImportConverter {
    fn convert(&self, data: PlainData) -> Result<Outcome<DataRecord>> {
        match data {
            PlainData::Array(items) => {
                let kind_field = self.kind_field.clone();
                let records = items
                    .into_iter()
                    .filter_map(move |item| Self::to_record(&kind_field, item).transpose());
                Ok(Outcome::Many(Box::new(records)))
            },
            other => Ok(match Self::to_record(&self.kind_field, other)? {
                Some(record) => Outcome::Kept(record),
                None => Outcome::Dropped,
            }),
        }
    }
}
