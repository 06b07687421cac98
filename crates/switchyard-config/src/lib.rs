//! Layered configuration store for switchyard
//!
//! Resolves dot-separated keys across five tiers, highest priority first:
//!
//! 1. **env** - `SWITCHYARD_<KEY>` environment variables (read-only)
//! 2. **project** - `.switchyard.toml`, found by searching upward from the
//!    working directory
//! 3. **machine** - `<config_dir>/switchyard/machine.toml`, never synced
//! 4. **user** - `<config_dir>/switchyard/config.toml`, the primary store
//! 5. **default** - compiled-in values (read-only)
//!
//! Every resolution reports which layer answered and where the value came
//! from.
//!
//! # Example
//!
//! ```ignore
//! use switchyard_config::{ConfigLayer, LayeredStore};
//!
//! let store = LayeredStore::from_process(std::env::current_dir()?);
//! store.set(ConfigLayer::User, "vault.backend", "1password")?;
//!
//! let resolved = store.get_layered("vault.backend")?;
//! println!("{} = {} (from {})", resolved.key, resolved.as_string(), resolved.source);
//! ```

mod document;
pub mod env;
pub mod error;
pub mod layer;
pub mod paths;
pub mod store;
pub mod value;

pub use env::{ENV_PREFIX, Environment, env_var_name};
pub use error::{Error, Result};
pub use layer::ConfigLayer;
pub use paths::{CONFIG_HOME_ENV, LayerPaths, PROJECT_FILE_NAME};
pub use store::{BUILTIN_ORIGIN, LayerResult, LayerWarning, LayeredStore};
pub use value::{ConfigTable, ConfigValue, parse_bool};
