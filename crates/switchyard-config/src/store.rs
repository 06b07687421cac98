//! The layered configuration store
//!
//! [`LayeredStore`] answers "what is the effective value of key K, and where
//! did it come from?" by consulting each [`ConfigLayer`] in priority order.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use serde::Serialize;
use switchyard_fs::NormalizedPath;

use crate::document;
use crate::env::{Environment, env_var_name};
use crate::paths::LayerPaths;
use crate::value::{self, ConfigTable, ConfigValue};
use crate::{ConfigLayer, Error, Result};

/// Origin reported for values served from the compiled-in defaults.
pub const BUILTIN_ORIGIN: &str = "built-in";

/// The outcome of resolving one key.
///
/// Every resolution names exactly one source layer. When no layer holds the
/// key, `source` is [`ConfigLayer::Default`] and `value` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerResult {
    pub key: String,
    pub value: Option<ConfigValue>,
    pub source: ConfigLayer,
    /// File path or environment variable that supplied the value
    pub origin: Option<String>,
}

impl LayerResult {
    fn fallthrough(key: &str) -> Self {
        Self {
            key: key.to_string(),
            value: None,
            source: ConfigLayer::Default,
            origin: None,
        }
    }

    /// The value as display text; the empty string when nothing was found.
    pub fn as_string(&self) -> String {
        self.value.as_ref().map(ConfigValue::render).unwrap_or_default()
    }

    /// Whether any layer actually held the key.
    pub fn is_found(&self) -> bool {
        self.value.is_some()
    }
}

/// A non-fatal problem met while reading a layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerWarning {
    pub layer: ConfigLayer,
    pub path: String,
    pub message: String,
}

impl fmt::Display for LayerWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} layer ({}): {}", self.layer, self.path, self.message)
    }
}

/// Cached resolutions are keyed by config key and the set of layers consulted.
type CacheKey = (String, u8);

fn layer_mask(layers: &[ConfigLayer]) -> u8 {
    layers.iter().fold(0, |mask, layer| mask | 1 << (*layer as u8))
}

/// Five-tier configuration store.
///
/// Reads take `&self` and may run concurrently; the result cache and the
/// warnings channel sit behind locks so writes (`set`, `unset`) can land
/// between reads without racing them.
#[derive(Debug)]
pub struct LayeredStore {
    paths: LayerPaths,
    defaults: ConfigTable,
    env: RwLock<Environment>,
    cache: RwLock<HashMap<CacheKey, LayerResult>>,
    /// Bumped under the cache write lock on every invalidation
    generation: AtomicU64,
    warnings: Mutex<Vec<LayerWarning>>,
}

impl LayeredStore {
    /// Create a store over the given layer files and environment snapshot.
    pub fn new(paths: LayerPaths, env: Environment) -> Self {
        Self {
            paths,
            defaults: ConfigTable::new(),
            env: RwLock::new(env),
            cache: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
            warnings: Mutex::new(Vec::new()),
        }
    }

    /// Create a store for the current process: platform paths searched from
    /// `cwd` and a snapshot of the process environment.
    pub fn from_process(cwd: impl AsRef<std::path::Path>) -> Self {
        let env = Environment::from_process();
        let paths = LayerPaths::platform(cwd, &env);
        Self::new(paths, env)
    }

    /// Install the compiled-in default layer.
    pub fn with_defaults(mut self, defaults: ConfigTable) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn paths(&self) -> &LayerPaths {
        &self.paths
    }

    /// A copy of the environment snapshot the store resolves against.
    pub fn environment(&self) -> Environment {
        self.env.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Change a variable in the store's environment snapshot.
    pub fn set_env_var(&self, name: impl Into<String>, value: impl Into<String>) {
        self.env
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set(name, value);
        self.clear_cache();
    }

    /// Remove a variable from the store's environment snapshot.
    pub fn remove_env_var(&self, name: &str) {
        self.env
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
        self.clear_cache();
    }

    /// The file backing a layer: the discovered (or would-be) file for
    /// `project`, the configured file for `machine` and `user`.
    pub fn layer_path(&self, layer: ConfigLayer) -> Result<NormalizedPath> {
        self.paths.write_path(layer)
    }

    /// Read `key` from the user layer only, bypassing every other layer.
    pub fn get(&self, key: &str) -> Result<ConfigValue> {
        value::split_key(key)?;
        let path = self.paths.user.as_ref().ok_or(Error::NotFound {
            key: key.to_string(),
        })?;

        let table = document::load(path)?.unwrap_or_default();
        value::lookup(&table, key)
            .filter(|v| !v.is_empty())
            .cloned()
            .ok_or_else(|| Error::NotFound {
                key: key.to_string(),
            })
    }

    /// Resolve `key` across all five layers.
    ///
    /// A key no layer holds is not an error: the result names the default
    /// layer with no value. Malformed layer files are skipped and reported
    /// through [`LayeredStore::warnings`].
    pub fn get_layered(&self, key: &str) -> Result<LayerResult> {
        self.get_layered_from(key, &ConfigLayer::ALL)
    }

    /// Resolve `key` across a subset of layers, still in priority order.
    pub fn get_layered_from(&self, key: &str, layers: &[ConfigLayer]) -> Result<LayerResult> {
        let cache_key = (key.to_string(), layer_mask(layers));
        if let Some(hit) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&cache_key)
        {
            return Ok(hit.clone());
        }

        let generation = self.generation.load(Ordering::Acquire);
        let result = self.resolve(key, layers)?;

        // A write that landed while resolving makes this result stale.
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::Acquire) == generation {
            cache.insert(cache_key, result.clone());
        }
        Ok(result)
    }

    fn resolve(&self, key: &str, layers: &[ConfigLayer]) -> Result<LayerResult> {
        value::split_key(key)?;
        for layer in ConfigLayer::ALL {
            if !layers.contains(&layer) {
                continue;
            }
            if let Some(found) = self.lookup_in(layer, key)? {
                tracing::debug!(key, source = %layer, "Resolved config key");
                return Ok(found);
            }
        }
        tracing::debug!(key, "Config key not set in any layer");
        Ok(LayerResult::fallthrough(key))
    }

    /// Every layer's candidate for `key`, highest priority first.
    ///
    /// The first entry, if any, is what [`LayeredStore::get_layered`] returns.
    pub fn explain(&self, key: &str) -> Result<Vec<LayerResult>> {
        value::split_key(key)?;
        let mut candidates = Vec::new();
        for layer in ConfigLayer::ALL {
            if let Some(found) = self.lookup_in(layer, key)? {
                candidates.push(found);
            }
        }
        Ok(candidates)
    }

    /// Write `value` at `key` in one writable layer.
    ///
    /// Creates the backing file and its parent directories when absent.
    pub fn set(&self, layer: ConfigLayer, key: &str, value: impl Into<ConfigValue>) -> Result<()> {
        if !layer.is_writable() {
            return Err(Error::ReadOnlyLayer { layer });
        }
        value::split_key(key)?;
        let path = self.paths.write_path(layer)?;
        let value = value.into();

        document::write_key(&path, key, &value)?;
        self.invalidate(key);
        tracing::debug!(key, layer = %layer, path = %path, "Set config value");
        Ok(())
    }

    /// Remove `key` from one writable layer. Returns whether it was present.
    pub fn unset(&self, layer: ConfigLayer, key: &str) -> Result<bool> {
        if !layer.is_writable() {
            return Err(Error::ReadOnlyLayer { layer });
        }
        value::split_key(key)?;
        let path = self.paths.write_path(layer)?;

        let removed = document::remove_key(&path, key)?;
        if removed {
            self.invalidate(key);
            tracing::debug!(key, layer = %layer, path = %path, "Unset config value");
        }
        Ok(removed)
    }

    /// Drain the malformed-layer warnings collected since the last call.
    pub fn warnings(&self) -> Vec<LayerWarning> {
        std::mem::take(&mut *self.warnings.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Drop every cached resolution.
    pub fn clear_cache(&self) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        self.generation.fetch_add(1, Ordering::AcqRel);
        cache.clear();
    }

    /// Drop cached resolutions a write to `key` could have changed: the key
    /// itself, its dotted ancestors and its dotted descendants.
    fn invalidate(&self, key: &str) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        self.generation.fetch_add(1, Ordering::AcqRel);
        cache.retain(|(cached, _), _| !keys_overlap(cached, key));
    }

    fn lookup_in(&self, layer: ConfigLayer, key: &str) -> Result<Option<LayerResult>> {
        let found = |value: ConfigValue, origin: String| {
            (!value.is_empty()).then(|| LayerResult {
                key: key.to_string(),
                value: Some(value),
                source: layer,
                origin: Some(origin),
            })
        };

        match layer {
            ConfigLayer::Environment => {
                let name = env_var_name(key);
                let env = self.env.read().unwrap_or_else(PoisonError::into_inner);
                Ok(env
                    .get(&name)
                    .and_then(|raw| found(ConfigValue::from(raw), name.clone())))
            }
            ConfigLayer::Default => Ok(value::lookup(&self.defaults, key)
                .cloned()
                .and_then(|v| found(v, BUILTIN_ORIGIN.to_string()))),
            ConfigLayer::Project | ConfigLayer::Machine | ConfigLayer::User => {
                let Some(path) = self.paths.read_path(layer) else {
                    return Ok(None);
                };
                let Some(table) = self.load_layer(layer, &path)? else {
                    return Ok(None);
                };
                Ok(value::lookup(&table, key)
                    .cloned()
                    .and_then(|v| found(v, path.to_string())))
            }
        }
    }

    /// Load a file layer, turning parse failures into warnings.
    ///
    /// I/O failures other than a missing file still propagate.
    fn load_layer(&self, layer: ConfigLayer, path: &NormalizedPath) -> Result<Option<ConfigTable>> {
        match document::load(path) {
            Ok(table) => Ok(table),
            Err(Error::Fs(
                e @ (switchyard_fs::Error::Parse { .. } | switchyard_fs::Error::UnsupportedFormat { .. }),
            )) => {
                self.warn(LayerWarning {
                    layer,
                    path: path.to_string(),
                    message: e.to_string(),
                });
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn warn(&self, warning: LayerWarning) {
        let mut pending = self.warnings.lock().unwrap_or_else(PoisonError::into_inner);
        if !pending.contains(&warning) {
            tracing::warn!(layer = %warning.layer, path = %warning.path, "{}", warning.message);
            pending.push(warning);
        }
    }
}

/// Whether one dotted key equals, contains or is contained by the other.
fn keys_overlap(a: &str, b: &str) -> bool {
    let nested = |outer: &str, inner: &str| {
        inner
            .strip_prefix(outer)
            .is_some_and(|rest| rest.starts_with('.'))
    };
    a == b || nested(a, b) || nested(b, a)
}
