//! Wire formats for exported and imported records.
//!
//! All formats implement the same traits, allowing format-agnostic code.
//!
//! # Supported Formats
//!
//! | Format | Writer | Reader | Extension |
//! |--------|--------|--------|-----------|
//! | JSON   | [`JsonWriter`] | [`JsonReader`] | `json` |
//! | XML    | [`XmlWriter`]  | [`XmlReader`]  | `xml`  |
//!
//! # Usage
//!
//! ```
//! use docalist_data::formats::{Format, Writer};
//! use serde_json::json;
//!
//! let writer = Format::from_extension("json").unwrap().writer();
//! let mut items = vec![Ok(json!({"title": "A"}))].into_iter();
//! let mut out = Vec::new();
//! writer.export(&mut items, &mut out)?;
//! assert_eq!(out, br#"[{"title":"A"}]"#);
//! # Ok::<(), docalist_data::DataError>(())
//! ```

mod traits;

pub mod json;
pub mod xml;

pub use json::{JsonReader, JsonWriter};
pub use traits::{Reader, RecordStream, Writer};
pub use xml::{XmlReader, XmlWriter};

use crate::config::FormatOptions;

/// Supported format types for format detection and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Format {
    /// JSON array (`.json`)
    Json,
    /// `<records>` XML document (`.xml`)
    Xml,
}

impl Format {
    /// Detect format from file extension.
    ///
    /// Returns `None` if the extension is not recognized.
    ///
    /// # Example
    ///
    /// ```
    /// use docalist_data::formats::Format;
    ///
    /// assert_eq!(Format::from_extension("XML"), Some(Format::Xml));
    /// assert_eq!(Format::from_extension("mrc"), None);
    /// ```
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }

    /// Get the canonical file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }

    /// Get the human-readable name for this format.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Xml => "XML",
        }
    }

    /// Compact writer for this format.
    #[must_use]
    pub fn writer(&self) -> Box<dyn Writer> {
        self.writer_with(FormatOptions::default())
    }

    /// Writer for this format with explicit options.
    #[must_use]
    pub fn writer_with(&self, options: FormatOptions) -> Box<dyn Writer> {
        match self {
            Self::Json => Box::new(JsonWriter::with_format(options)),
            Self::Xml => Box::new(XmlWriter::with_format(options)),
        }
    }

    /// Reader for this format.
    #[must_use]
    pub fn reader(&self) -> Box<dyn Reader> {
        match self {
            Self::Json => Box::new(JsonReader),
            Self::Xml => Box::new(XmlReader),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_extension("json"), Some(Format::Json));
        assert_eq!(Format::from_extension("JSON"), Some(Format::Json));
        assert_eq!(Format::from_extension("xml"), Some(Format::Xml));
        assert_eq!(Format::from_extension("csv"), None);
    }

    #[test]
    fn test_format_extension_matches_writer_filename() {
        for format in [Format::Json, Format::Xml] {
            let filename = format.writer().default_filename();
            assert!(filename.ends_with(format.extension()));
        }
    }

    #[test]
    fn test_format_display() {
        assert_eq!(format!("{}", Format::Json), "JSON");
        assert_eq!(format!("{}", Format::Xml), "XML");
    }

    #[test]
    fn test_writer_with_options() {
        let writer = Format::Xml.writer_with(FormatOptions::pretty());
        assert!(writer.options().pretty);
    }
}
