//! Named feature bundles

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{Error, Result};

/// A named bundle of features applied together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub name: String,
    pub description: String,
    /// Features enabled by the preset, in application order
    pub features: Vec<String>,
}

impl Preset {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            features: Vec::new(),
        }
    }

    /// Append features to the bundle (builder pattern).
    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features.extend(features.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct PresetCatalog {
    presets: BTreeMap<String, Preset>,
}

impl PresetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        for preset in crate::builtins::builtin_presets() {
            if let Err(e) = catalog.register(preset) {
                tracing::warn!("Skipping built-in preset: {e}");
            }
        }
        catalog
    }

    pub fn register(&mut self, preset: Preset) -> Result<()> {
        if self.presets.contains_key(&preset.name) {
            return Err(Error::DuplicatePreset { name: preset.name });
        }
        self.presets.insert(preset.name.clone(), preset);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    /// Look up a preset, failing with [`Error::UnknownPreset`].
    pub fn require(&self, name: &str) -> Result<&Preset> {
        self.get(name).ok_or_else(|| Error::UnknownPreset {
            name: name.to_string(),
        })
    }

    /// All presets, sorted by name.
    pub fn all(&self) -> Vec<&Preset> {
        self.presets.values().collect()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
