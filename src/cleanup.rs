//! Cleanup operations applied to converted records before they are written.
//!
//! Three operations, always registered in this order by
//! [`cleanup_pipeline`]:
//!
//! 1. [`FilterEmptyElements`]: recursively removes empty elements.
//! 2. [`FilterEmpty`]: drops the whole item if nothing is left.
//! 3. [`SortByKey`]: sorts top-level keys case-insensitively.
//!
//! "Empty" has a precise meaning here, see [`is_empty_value`]: `null`, `""`,
//! `[]` and `{}`. Falsy values such as `0` and `false` are kept.
//!
//! # Examples
//!
//! ```
//! use docalist_data::cleanup::cleanup_pipeline;
//! use serde_json::json;
//!
//! let pipeline = cleanup_pipeline();
//! let out: Vec<_> = pipeline
//!     .process(vec![
//!         json!({"title": "B", "tags": ["x", ""]}),
//!         json!({"title": "", "tags": []}),
//!     ])
//!     .collect::<docalist_data::Result<_>>()?;
//!
//! assert_eq!(out, vec![json!({"tags": ["x"], "title": "B"})]);
//! # Ok::<(), docalist_data::DataError>(())
//! ```

use crate::error::Result;
use crate::operation::{Operation, Outcome};
use crate::pipeline::Pipeline;
use crate::value::{is_empty_value, Mapping, PlainData};

/// Pipeline key of [`FilterEmptyElements`] in [`cleanup_pipeline`].
pub const FILTER_EMPTY_ELEMENTS: &str = "filter-empty-elements";
/// Pipeline key of [`FilterEmpty`] in [`cleanup_pipeline`].
pub const FILTER_EMPTY: &str = "filter-empty";
/// Pipeline key of [`SortByKey`] in [`cleanup_pipeline`].
pub const SORT_BY_KEY: &str = "sort-by-key";

/// Recursively removes empty elements from mappings and sequences.
///
/// Containers are cleaned depth-first; a container that becomes empty is then
/// removed from its parent too. Scalars are returned unchanged. The
/// operation is idempotent and never drops the item itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEmptyElements;

impl FilterEmptyElements {
    /// Returns `value` with every empty element removed, at any depth.
    #[must_use]
    pub fn clean(value: PlainData) -> PlainData {
        match value {
            PlainData::Object(map) => PlainData::Object(clean_mapping(map)),
            PlainData::Array(items) => PlainData::Array(clean_sequence(items)),
            scalar => scalar,
        }
    }
}

fn clean_mapping(map: Mapping) -> Mapping {
    map.into_iter()
        .map(|(key, value)| (key, FilterEmptyElements::clean(value)))
        .filter(|(_, value)| !is_empty_value(value))
        .collect()
}

fn clean_sequence(items: Vec<PlainData>) -> Vec<PlainData> {
    items
        .into_iter()
        .map(FilterEmptyElements::clean)
        .filter(|value| !is_empty_value(value))
        .collect()
}

impl Operation<PlainData> for FilterEmptyElements {
    fn name(&self) -> &str {
        "filter-empty-elements"
    }

    fn apply(&self, item: PlainData) -> Result<Outcome<PlainData>> {
        Ok(Outcome::Kept(Self::clean(item)))
    }
}

/// Drops items that are empty as a whole.
///
/// Only the item itself is tested: `{"a": []}` is not empty and passes
/// through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEmpty;

impl Operation<PlainData> for FilterEmpty {
    fn name(&self) -> &str {
        "filter-empty"
    }

    fn apply(&self, item: PlainData) -> Result<Outcome<PlainData>> {
        if is_empty_value(&item) {
            Ok(Outcome::Dropped)
        } else {
            Ok(Outcome::Kept(item))
        }
    }
}

/// Sorts the keys of the top-level mapping, ignoring case.
///
/// Nested mappings keep their original key order. Keys that differ only by
/// case are ordered by their exact value so the output is deterministic.
/// Non-mapping items pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortByKey;

impl Operation<PlainData> for SortByKey {
    fn name(&self) -> &str {
        "sort-by-key"
    }

    fn apply(&self, item: PlainData) -> Result<Outcome<PlainData>> {
        let PlainData::Object(map) = item else {
            return Ok(Outcome::Kept(item));
        };
        let mut entries: Vec<(String, PlainData)> = map.into_iter().collect();
        entries.sort_by_cached_key(|(key, _)| (key.to_lowercase(), key.clone()));
        Ok(Outcome::Kept(PlainData::Object(entries.into_iter().collect())))
    }
}

/// Build the standard cleanup pipeline.
///
/// Stages are keyed with [`FILTER_EMPTY_ELEMENTS`], [`FILTER_EMPTY`] and
/// [`SORT_BY_KEY`], in that order.
#[must_use]
pub fn cleanup_pipeline() -> Pipeline<PlainData> {
    let mut pipeline = Pipeline::new();
    append_cleanup(&mut pipeline);
    pipeline
}

/// Append the three cleanup stages to an existing pipeline.
///
/// Keys already present in `pipeline` are left alone and that stage is not
/// added twice.
pub fn append_cleanup(pipeline: &mut Pipeline<PlainData>) {
    pipeline.append_keyed_if_absent(FILTER_EMPTY_ELEMENTS, FilterEmptyElements);
    pipeline.append_keyed_if_absent(FILTER_EMPTY, FilterEmpty);
    pipeline.append_keyed_if_absent(SORT_BY_KEY, SortByKey);
}
