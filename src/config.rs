//! Formatting options shared by the writers.
//!
//! Options are copied into a writer when it is built, so they cannot change
//! once an export has started.

use serde::Deserialize;

use crate::error::Result;

/// Default indent width used in pretty mode.
pub const DEFAULT_INDENT: usize = 4;

/// Per-format output options.
///
/// # Examples
///
/// ```
/// use docalist_data::config::FormatOptions;
///
/// let options = FormatOptions::new().with_pretty(true).with_indent(2);
/// assert!(options.pretty);
/// assert_eq!(options.effective_indent(), 2);
///
/// let loaded = FormatOptions::from_json_str(r#"{"pretty": true}"#)?;
/// assert_eq!(loaded.indent, 4);
/// # Ok::<(), docalist_data::DataError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatOptions {
    /// Indented, line-broken output.
    pub pretty: bool,

    /// Number of spaces per indentation level in pretty mode.
    pub indent: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: DEFAULT_INDENT,
        }
    }
}

impl FormatOptions {
    /// Compact output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty output with the default indent.
    #[must_use]
    pub fn pretty() -> Self {
        Self::default().with_pretty(true)
    }

    /// Enables or disables pretty output.
    #[must_use]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Sets the indent width.
    #[must_use]
    pub const fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Indent actually used: `0` in compact mode.
    #[must_use]
    pub const fn effective_indent(&self) -> usize {
        if self.pretty {
            self.indent
        } else {
            0
        }
    }

    /// Load options from a JSON document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or has unknown fields.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
