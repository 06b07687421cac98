//! Feature registry and enablement resolution for switchyard
//!
//! - [`FeatureCatalog`] and [`PresetCatalog`] hold the compiled-in features
//!   and named bundles, bundled into a [`FeatureRegistry`]
//! - [`FeatureResolver`] decides which features are on, enforcing dependency
//!   and conflict rules before any state changes
//!
//! # Example
//!
//! ```
//! use switchyard_config::Environment;
//! use switchyard_features::{FeatureRegistry, FeatureResolver};
//!
//! let registry = FeatureRegistry::with_builtins();
//! let resolver = FeatureResolver::new(&registry, Environment::empty());
//!
//! resolver.enable("plugins").unwrap();
//! assert!(resolver.enabled("hooks"));
//! ```

pub mod builtins;
pub mod catalog;
pub mod env;
pub mod error;
pub mod feature;
pub mod graph;
pub mod preset;
pub mod registry;
pub mod resolver;

pub use builtins::{BUILTIN_FEATURE_COUNT, builtin_config_defaults};
pub use catalog::FeatureCatalog;
pub use env::{EnvOverride, LEGACY_SKIP_VARS, env_override, feature_key, flag_var};
pub use error::{Error, Result};
pub use feature::{Category, DefaultPolicy, Feature};
pub use preset::{Preset, PresetCatalog};
pub use registry::FeatureRegistry;
pub use resolver::{Enablement, EnablementSource, FeatureResolver, FeatureState, FeatureStatus};
