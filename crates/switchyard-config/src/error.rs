//! Error types for switchyard-config

use crate::ConfigLayer;

/// Result type for switchyard-config operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in switchyard-config operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Direct lookup of a key absent from the user layer
    #[error("Key not found in user config: {key}")]
    NotFound { key: String },

    /// Write attempted against the environment or compiled-in default layer
    #[error("The {layer} layer is read-only")]
    ReadOnlyLayer { layer: ConfigLayer },

    /// Key is empty or has an empty dotted segment
    #[error("Invalid config key {key:?}: keys are dot-separated non-empty segments")]
    InvalidKey { key: String },

    /// A write needs a table where the layer already holds a scalar
    #[error("Cannot write {key}: {segment} already holds a non-table value")]
    NotATable { key: String, segment: String },

    /// The layer has no backing file configured on this host
    #[error("No file is configured for the {layer} layer")]
    NoLayerPath { layer: ConfigLayer },

    /// Unrecognized layer name
    #[error("Unknown config layer {name:?} (expected one of: env, project, machine, user, default)")]
    UnknownLayer { name: String },

    /// Filesystem error from switchyard-fs
    #[error(transparent)]
    Fs(#[from] switchyard_fs::Error),
}
