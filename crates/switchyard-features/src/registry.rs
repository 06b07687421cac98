//! The feature registry value shared by every component

use crate::{FeatureCatalog, PresetCatalog};

/// Feature and preset catalogs, built once per process and passed by
/// reference to whatever needs them.
#[derive(Debug, Clone, Default)]
pub struct FeatureRegistry {
    features: FeatureCatalog,
    presets: PresetCatalog,
}

impl FeatureRegistry {
    pub fn new(features: FeatureCatalog, presets: PresetCatalog) -> Self {
        Self { features, presets }
    }

    /// The built-in features and presets.
    pub fn with_builtins() -> Self {
        Self::new(FeatureCatalog::with_builtins(), PresetCatalog::with_builtins())
    }

    pub fn features(&self) -> &FeatureCatalog {
        &self.features
    }

    pub fn presets(&self) -> &PresetCatalog {
        &self.presets
    }
}
