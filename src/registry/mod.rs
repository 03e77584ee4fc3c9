//! Static filter table
//!
//! Filters are registered once through [`RegistryBuilder`]; the resulting
//! [`FilterRegistry`] is immutable and shared between pipelines.

use crate::command::split_filter_name;
use crate::config::EngineConfig;
use crate::error::{PipelineError, Result};
use crate::variables::GlobalVariables;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub mod capability;
pub mod descriptor;

pub use capability::CapabilitySet;
pub use descriptor::{
    ArgumentMeta, BuiltinOp, CodeSample, FilterDescriptor, FilterFn, FilterInfo, FilterKind,
};

use descriptor::registry_key;

/// Availability report entry for one filter
#[derive(Debug, Clone, Serialize)]
pub struct FilterAvailability {
    #[serde(flatten)]
    pub info: FilterInfo,
    pub available: bool,
}

/// Immutable mapping from `category.name` to filter descriptors
#[derive(Debug, Clone)]
pub struct FilterRegistry {
    // Keyed by the case-folded name; BTreeMap keeps listings sorted
    filters: BTreeMap<String, FilterDescriptor>,
    capabilities: CapabilitySet,
}

impl FilterRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registry with the core built-ins and the bundled filters
    ///
    /// `globals` is the shared tier the file filters read their sandbox root
    /// from; pass the same handle the engine uses.
    pub fn with_defaults(config: &EngineConfig, globals: &GlobalVariables) -> Result<Self> {
        let mut builder = Self::builder().register_all(crate::filters::core::descriptors());

        if config.enable_test_filters {
            builder = builder.register_all(crate::filters::core::test_descriptors());
        }

        builder
            .register_all(crate::filters::text::descriptors())
            .register_all(crate::filters::file::descriptors(globals.clone()))
            .capabilities(config.capabilities.iter().cloned())
            .build()
    }

    /// Look up a filter by category and name, ignoring ASCII case
    pub fn lookup(&self, category: &str, name: &str) -> Result<&FilterDescriptor> {
        self.filters
            .get(&registry_key(category, name))
            .ok_or_else(|| PipelineError::unknown_filter(format!("{category}.{name}")))
    }

    /// Look up `Category.Name`, or a bare name in the `Core` category
    pub fn lookup_name(&self, full_name: &str) -> Result<&FilterDescriptor> {
        let (category, name) = split_filter_name(full_name);
        self.lookup(category, name)
            .map_err(|_| PipelineError::unknown_filter(full_name))
    }

    pub fn contains(&self, full_name: &str) -> bool {
        self.lookup_name(full_name).is_ok()
    }

    /// Whether the descriptor's declared dependency is satisfiable here
    pub fn check_capability(&self, descriptor: &FilterDescriptor) -> bool {
        self.capabilities
            .satisfies(descriptor.required_capability.as_deref())
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// All filters, sorted by case-folded name
    pub fn filters(&self) -> impl Iterator<Item = &FilterDescriptor> {
        self.filters.values()
    }

    /// Distinct category names in registration spelling
    pub fn categories(&self) -> Vec<&str> {
        let categories: BTreeSet<&str> = self.filters.values().map(|f| f.category.as_str()).collect();
        categories.into_iter().collect()
    }

    /// Every filter with its capability status
    pub fn availability(&self) -> Vec<FilterAvailability> {
        self.filters()
            .map(|descriptor| FilterAvailability {
                info: descriptor.info(),
                available: self.check_capability(descriptor),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Collects descriptors before the registry is frozen
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    descriptors: Vec<FilterDescriptor>,
    capabilities: CapabilitySet,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, descriptor: FilterDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn register_all(mut self, descriptors: impl IntoIterator<Item = FilterDescriptor>) -> Self {
        self.descriptors.extend(descriptors);
        self
    }

    /// Declare additional capabilities available
    pub fn capabilities<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.capabilities.extend(names);
        self
    }

    /// Replace the capability set entirely
    pub fn with_capability_set(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Freeze the table; duplicate names are rejected
    pub fn build(self) -> Result<FilterRegistry> {
        let mut filters = BTreeMap::new();

        for descriptor in self.descriptors {
            let key = descriptor.key();
            if filters.contains_key(&key) {
                return Err(PipelineError::invalid_argument(
                    descriptor.full_name(),
                    "filter is registered more than once",
                ));
            }
            debug!(filter = %descriptor.full_name(), "registered filter");
            filters.insert(key, descriptor);
        }

        Ok(FilterRegistry {
            filters,
            capabilities: self.capabilities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper() -> FilterDescriptor {
        FilterDescriptor::external("Text", "Upper", |text, _| Ok(text.to_uppercase()))
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = FilterRegistry::builder().register(upper()).build().unwrap();

        let found = registry.lookup("text", "UPPER").unwrap();
        assert_eq!(found.full_name(), "Text.Upper");
        assert!(registry.contains("TEXT.upper"));
    }

    #[test]
    fn test_unknown_filter() {
        let registry = FilterRegistry::builder().build().unwrap();
        let err = registry.lookup_name("Frobnicate").unwrap_err();
        assert!(err.is_unknown_filter());
        assert!(err.to_string().contains("Frobnicate"));
    }

    #[test]
    fn test_bare_names_resolve_to_core() {
        let registry = FilterRegistry::builder()
            .register(FilterDescriptor::builtin("Core", "Clear", BuiltinOp::Clear))
            .build()
            .unwrap();

        assert!(registry.lookup_name("clear").is_ok());
        assert!(registry.lookup_name("Core.Clear").is_ok());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let err = FilterRegistry::builder()
            .register(upper())
            .register(FilterDescriptor::external("TEXT", "upper", |t, _| Ok(t.to_string())))
            .build()
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_check_capability() {
        let needs_fake = FilterDescriptor::external("Core", "FakeTest", |t, _| Ok(t.to_string()))
            .requires("SomeFakeClass");
        let registry = FilterRegistry::builder()
            .register(needs_fake)
            .register(upper())
            .build()
            .unwrap();

        let fake = registry.lookup("Core", "FakeTest").unwrap();
        assert!(!registry.check_capability(fake));
        assert!(registry.check_capability(registry.lookup("Text", "Upper").unwrap()));

        let report = registry.availability();
        assert_eq!(report.len(), 2);
        assert!(!report.iter().find(|r| r.info.name == "Core.FakeTest").unwrap().available);
    }

    #[test]
    fn test_declared_capability_becomes_available() {
        let registry = FilterRegistry::builder()
            .register(upper().requires("SomeFakeClass"))
            .capabilities(["SomeFakeClass"])
            .build()
            .unwrap();
        assert!(registry.check_capability(registry.lookup("Text", "Upper").unwrap()));
    }

    #[test]
    fn test_defaults_respect_test_filter_flag() {
        let plain = FilterRegistry::with_defaults(&EngineConfig::default(), &GlobalVariables::new()).unwrap();
        assert!(!plain.contains("FakeTest"));
        assert!(plain.contains("SetVar"));
        assert!(plain.contains("File.Read"));

        let config = EngineConfig {
            enable_test_filters: true,
            ..EngineConfig::default()
        };
        let with_tests = FilterRegistry::with_defaults(&config, &GlobalVariables::new()).unwrap();
        assert!(with_tests.contains("FakeTest"));
        assert_eq!(with_tests.len(), plain.len() + 1);
    }

    #[test]
    fn test_categories_listed_once() {
        let registry = FilterRegistry::with_defaults(&EngineConfig::default(), &GlobalVariables::new()).unwrap();
        assert_eq!(registry.categories(), vec!["Core", "File", "Text"]);
    }
}
