//! Feature catalog storage

use std::collections::BTreeMap;

use crate::{Category, Error, Feature, Result};

/// Registered features keyed by name.
///
/// Every listing is sorted by name so output is deterministic.
#[derive(Debug, Clone, Default)]
pub struct FeatureCatalog {
    features: BTreeMap<String, Feature>,
}

impl FeatureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog pre-populated with the built-in features.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        for feature in crate::builtins::builtin_features() {
            if let Err(e) = catalog.register(feature) {
                tracing::warn!("Skipping built-in feature: {e}");
            }
        }
        catalog
    }

    /// Register a feature. Names must be unique.
    pub fn register(&mut self, feature: Feature) -> Result<()> {
        if self.features.contains_key(&feature.name) {
            return Err(Error::DuplicateFeature { name: feature.name });
        }
        self.features.insert(feature.name.clone(), feature);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Feature> {
        self.features.get(name)
    }

    /// Look up a feature, failing with [`Error::UnknownFeature`].
    pub fn require(&self, name: &str) -> Result<&Feature> {
        self.get(name).ok_or_else(|| Error::unknown_feature(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.features.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// All features, sorted by name.
    pub fn all(&self) -> Vec<&Feature> {
        self.features.values().collect()
    }

    /// Features in one category, sorted by name.
    pub fn by_category(&self, category: Category) -> Vec<&Feature> {
        self.features
            .values()
            .filter(|f| f.category == category)
            .collect()
    }

    /// Every feature declaring `name` as a dependency, sorted by name.
    pub fn dependents(&self, name: &str) -> Vec<&Feature> {
        self.features
            .values()
            .filter(|f| f.dependencies.iter().any(|d| d == name))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }
}
