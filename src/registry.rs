//! Explicit registry of exporters and importers, keyed by stable string IDs.
//!
//! A [`Registry`] is built once at startup and passed to whatever needs to
//! list or instantiate exporters and importers. IDs enumerate in registration
//! order. Each lookup builds a fresh instance from the registered factory.
//!
//! # Examples
//!
//! ```
//! use docalist_data::registry::Registry;
//!
//! let registry = Registry::with_defaults();
//! assert_eq!(
//!     registry.exporter_ids().collect::<Vec<_>>(),
//!     ["docalist-json", "docalist-json-pretty", "docalist-xml", "docalist-xml-pretty"]
//! );
//!
//! let exporter = registry.exporter("docalist-xml-pretty")?;
//! assert_eq!(exporter.suggested_filename(), "docalist-xml-pretty-export.xml");
//! # Ok::<(), docalist_data::DataError>(())
//! ```

use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{DataError, Result};
use crate::exporter::Exporter;
use crate::importer::Importer;

/// Builds a new exporter.
pub type ExporterFactory = fn() -> Exporter;

/// Builds a new importer.
pub type ImporterFactory = fn() -> Importer;

/// ID to factory maps for exporters and importers.
#[derive(Default)]
pub struct Registry {
    exporters: IndexMap<String, ExporterFactory>,
    importers: IndexMap<String, ImporterFactory>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("exporters", &self.exporters.keys().collect::<Vec<_>>())
            .field("importers", &self.importers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the standard JSON and XML exporters and importers.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.exporters.insert(crate::exporter::JSON.to_string(), Exporter::json);
        registry
            .exporters
            .insert(crate::exporter::JSON_PRETTY.to_string(), Exporter::json_pretty);
        registry.exporters.insert(crate::exporter::XML.to_string(), Exporter::xml);
        registry
            .exporters
            .insert(crate::exporter::XML_PRETTY.to_string(), Exporter::xml_pretty);
        registry.importers.insert(crate::importer::JSON.to_string(), Importer::json);
        registry.importers.insert(crate::importer::XML.to_string(), Importer::xml);
        registry
    }

    /// Register an exporter factory under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidConfiguration`] if `id` is empty or
    /// already registered.
    pub fn register_exporter(
        &mut self,
        id: impl Into<String>,
        factory: ExporterFactory,
    ) -> Result<&mut Self> {
        let id = checked_id(id.into(), |id| self.exporters.contains_key(id), "exporter")?;
        debug!(id = %id, "exporter registered");
        self.exporters.insert(id, factory);
        Ok(self)
    }

    /// Register an importer factory under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidConfiguration`] if `id` is empty or
    /// already registered.
    pub fn register_importer(
        &mut self,
        id: impl Into<String>,
        factory: ImporterFactory,
    ) -> Result<&mut Self> {
        let id = checked_id(id.into(), |id| self.importers.contains_key(id), "importer")?;
        debug!(id = %id, "importer registered");
        self.importers.insert(id, factory);
        Ok(self)
    }

    /// New instance of the exporter registered under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidConfiguration`] if `id` is unknown.
    pub fn exporter(&self, id: &str) -> Result<Exporter> {
        self.exporters
            .get(id)
            .map(|factory| factory())
            .ok_or_else(|| unknown(id, "exporter"))
    }

    /// New instance of the importer registered under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidConfiguration`] if `id` is unknown.
    pub fn importer(&self, id: &str) -> Result<Importer> {
        self.importers
            .get(id)
            .map(|factory| factory())
            .ok_or_else(|| unknown(id, "importer"))
    }

    /// True if an exporter is registered under `id`.
    #[must_use]
    pub fn has_exporter(&self, id: &str) -> bool {
        self.exporters.contains_key(id)
    }

    /// True if an importer is registered under `id`.
    #[must_use]
    pub fn has_importer(&self, id: &str) -> bool {
        self.importers.contains_key(id)
    }

    /// Exporter IDs, in registration order.
    pub fn exporter_ids(&self) -> impl Iterator<Item = &str> {
        self.exporters.keys().map(String::as_str)
    }

    /// Importer IDs, in registration order.
    pub fn importer_ids(&self) -> impl Iterator<Item = &str> {
        self.importers.keys().map(String::as_str)
    }

    /// One instance of every registered exporter, in registration order.
    pub fn exporters(&self) -> impl Iterator<Item = Exporter> + '_ {
        self.exporters.values().map(|factory| factory())
    }
}

fn checked_id(id: String, exists: impl Fn(&str) -> bool, what: &str) -> Result<String> {
    if id.is_empty() {
        return Err(DataError::InvalidConfiguration(format!("empty {what} id")));
    }
    if exists(&id) {
        return Err(DataError::InvalidConfiguration(format!(
            "{what} '{id}' is already registered"
        )));
    }
    Ok(id)
}

fn unknown(id: &str, what: &str) -> DataError {
    DataError::InvalidConfiguration(format!("unknown {what} '{id}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom() -> Exporter {
        Exporter::json().with_identity("custom", "Custom", "Custom JSON export.")
    }

    #[test]
    fn test_defaults() {
        let registry = Registry::with_defaults();
        assert_eq!(
            registry.importer_ids().collect::<Vec<_>>(),
            vec!["docalist-json", "docalist-xml"]
        );
        for id in registry.exporter_ids() {
            assert_eq!(registry.exporter(id).unwrap().id(), id);
        }
        for id in registry.importer_ids() {
            assert_eq!(registry.importer(id).unwrap().id(), id);
        }
    }

    #[test]
    fn test_instances_are_independent() {
        let registry = Registry::with_defaults();
        let mut first = registry.exporter("docalist-json").unwrap();
        first.pipeline_mut().append(crate::cleanup::SortByKey);
        let second = registry.exporter("docalist-json").unwrap();
        assert_eq!(second.pipeline().len(), first.pipeline().len() - 1);
    }

    #[test]
    fn test_register_and_enumerate_in_order() {
        let mut registry = Registry::with_defaults();
        registry.register_exporter("custom", custom).unwrap();
        assert!(registry.has_exporter("custom"));
        assert_eq!(registry.exporter_ids().last(), Some("custom"));
        assert_eq!(registry.exporters().count(), 5);
        assert_eq!(registry.exporter("custom").unwrap().label(), "Custom");
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = Registry::with_defaults();
        let err = registry
            .register_exporter("docalist-json", custom)
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidConfiguration(_)));
        assert_eq!(registry.exporter("docalist-json").unwrap().label(), "Docalist JSON");

        assert!(registry
            .register_importer("docalist-xml", Importer::json)
            .is_err());
    }

    #[test]
    fn test_empty_id_rejected() {
        let mut registry = Registry::new();
        assert!(registry.register_importer("", Importer::json).is_err());
        assert!(!registry.has_importer(""));
    }

    #[test]
    fn test_unknown_id() {
        let registry = Registry::new();
        assert!(matches!(
            registry.exporter("nope"),
            Err(DataError::InvalidConfiguration(_))
        ));
        assert!(registry.importer("nope").is_err());
        assert_eq!(registry.exporter_ids().count(), 0);
    }

    #[test]
    fn test_debug_lists_ids() {
        let debug = format!("{:?}", Registry::with_defaults());
        assert!(debug.contains("docalist-xml-pretty"));
    }
}
