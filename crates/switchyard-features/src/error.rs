//! Error types for switchyard-features

/// Result type for switchyard-features operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in switchyard-features operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown feature: {name}")]
    UnknownFeature { name: String },

    #[error("Unknown preset: {name}")]
    UnknownPreset { name: String },

    #[error("Unknown feature category {name:?} (expected one of: core, optional, integration)")]
    UnknownCategory { name: String },

    #[error("Feature already registered: {name}")]
    DuplicateFeature { name: String },

    #[error("Preset already registered: {name}")]
    DuplicatePreset { name: String },

    /// A dependency path revisits a feature already on it
    #[error("Circular dependency: {}", path.join(" -> "))]
    CircularDependency { path: Vec<String> },

    /// Enabling `feature` would leave it enabled alongside `conflicting`
    #[error("Feature {feature} conflicts with {conflicting}")]
    Conflict { feature: String, conflicting: String },

    #[error("Feature {name} is a core feature and cannot be disabled")]
    CoreFeature { name: String },

    #[error("Feature {feature} depends on unregistered feature {dependency}")]
    UnknownDependency { feature: String, dependency: String },

    #[error("Feature {feature} declares a conflict with unregistered feature {conflict}")]
    UnknownConflict { feature: String, conflict: String },

    #[error("Preset {preset} lists unregistered feature {feature}")]
    UnknownPresetFeature { preset: String, feature: String },

    /// Persisting needs a configuration store
    #[error("No configuration store is attached; feature state cannot be persisted")]
    NoStore,

    #[error(transparent)]
    Config(#[from] switchyard_config::Error),
}

impl Error {
    pub(crate) fn unknown_feature(name: &str) -> Self {
        Self::UnknownFeature {
            name: name.to_string(),
        }
    }
}
