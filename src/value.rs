//! Plain data: the generic nested structure exchanged inside pipelines.
//!
//! [`PlainData`] is a `serde_json` value built with the `preserve_order`
//! feature, so mappings keep their insertion order at every nesting level.
//! Only the top-level key order is ever changed, and only by
//! [`SortByKey`](crate::cleanup::SortByKey).

/// Generic nested structure: mapping, sequence, scalar or null.
pub type PlainData = serde_json::Value;

/// Ordered mapping from field name to [`PlainData`].
pub type Mapping = serde_json::Map<String, PlainData>;

/// Returns true if `value` counts as empty for cleanup purposes.
///
/// Empty means exactly one of: `null`, `""`, `[]` or `{}`. Falsy scalars such
/// as `0` and `false` are not empty, and neither is a container holding them.
///
/// # Examples
///
/// ```
/// use docalist_data::value::is_empty_value;
/// use serde_json::json;
///
/// assert!(is_empty_value(&json!("")));
/// assert!(is_empty_value(&json!({})));
/// assert!(!is_empty_value(&json!(0)));
/// assert!(!is_empty_value(&json!([0])));
/// ```
#[must_use]
pub fn is_empty_value(value: &PlainData) -> bool {
    match value {
        PlainData::Null => true,
        PlainData::String(s) => s.is_empty(),
        PlainData::Array(items) => items.is_empty(),
        PlainData::Object(map) => map.is_empty(),
        PlainData::Bool(_) | PlainData::Number(_) => false,
    }
}
