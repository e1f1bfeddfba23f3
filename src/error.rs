//! Error types for export and import operations.
//!
//! This module provides the [`DataError`] type for all pipeline, converter,
//! reader and writer operations, and the [`Result`] convenience type.

use thiserror::Error;

/// Error type for all export/import operations.
///
/// Errors are fatal to a run: the pipeline never skips an item because of an
/// error, it surfaces the error to the caller and stops.
#[derive(Error, Debug)]
pub enum DataError {
    /// Invalid configuration detected before any item is processed
    /// (unknown pipeline key, duplicate registration, invalid tag name...).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// No converter supports the given record kind.
    #[error("Record kind not supported: {kind}")]
    UnsupportedRecord {
        /// Kind reported by the record.
        kind: String,
    },

    /// A converter or operation failed on an item.
    #[error("Conversion error: {0}")]
    ConversionError(String),

    /// The output stream failed while an export was being written.
    #[error("Write error: {0}")]
    WriteError(#[source] std::io::Error),

    /// Malformed input data in a reader.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// IO error from the underlying source.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl DataError {
    /// Wraps any quick-xml failure raised while writing as a [`DataError::WriteError`].
    pub(crate) fn from_xml_write(error: quick_xml::Error) -> Self {
        match error {
            quick_xml::Error::Io(io) => {
                Self::WriteError(std::io::Error::new(io.kind(), io.to_string()))
            },
            other => Self::WriteError(std::io::Error::other(other.to_string())),
        }
    }
}

/// Convenience type alias for [`std::result::Result`] with [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;
