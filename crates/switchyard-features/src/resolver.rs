//! Feature enablement resolution
//!
//! [`FeatureResolver`] answers "is feature F on, and why?" A feature's state
//! is decided by the first of these that has an answer:
//!
//! 1. core features are always on
//! 2. explicit runtime state set in this process (`enable`, `disable`,
//!    `load_state`, `apply_preset`)
//! 3. the environment: `SWITCHYARD_FEATURES_<NAME>`, then legacy `SKIP_*`
//! 4. `features.<name>` persisted in the project, machine or user layer
//! 5. the feature's default policy

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use switchyard_config::{ConfigLayer, Environment, LayeredStore};

use crate::env::{env_override, feature_key};
use crate::{Category, Error, Feature, FeatureRegistry, Result, graph};

/// Explicit per-feature toggles, as imported and exported in bulk.
pub type FeatureState = BTreeMap<String, bool>;

/// Which resolution step decided a feature's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EnablementSource {
    Core,
    Runtime,
    #[serde(rename = "env")]
    Environment { var: String },
    Persisted { layer: ConfigLayer },
    Default,
}

impl fmt::Display for EnablementSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core => f.write_str("core"),
            Self::Runtime => f.write_str("runtime"),
            Self::Environment { var } => write!(f, "env ({var})"),
            Self::Persisted { layer } => write!(f, "persisted ({layer})"),
            Self::Default => f.write_str("default"),
        }
    }
}

/// A feature's resolved state and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enablement {
    pub enabled: bool,
    pub source: EnablementSource,
}

impl Enablement {
    fn new(enabled: bool, source: EnablementSource) -> Self {
        Self { enabled, source }
    }
}

/// One row of [`FeatureResolver::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureStatus {
    pub name: String,
    pub category: Category,
    pub enabled: bool,
    pub source: EnablementSource,
}

/// Resolves and mutates feature enablement against a [`FeatureRegistry`].
///
/// Runtime state lives for the lifetime of the resolver. Reads take `&self`
/// and may run concurrently with each other; graph invariants are checked
/// before any state changes, so a failed `enable` leaves nothing behind.
#[derive(Debug)]
pub struct FeatureResolver<'a> {
    registry: &'a FeatureRegistry,
    env: Environment,
    store: Option<&'a LayeredStore>,
    state: RwLock<FeatureState>,
}

impl<'a> FeatureResolver<'a> {
    pub fn new(registry: &'a FeatureRegistry, env: Environment) -> Self {
        Self {
            registry,
            env,
            store: None,
            state: RwLock::new(FeatureState::new()),
        }
    }

    /// Consult persisted `features.<name>` toggles in `store`, and allow
    /// [`FeatureResolver::persist`].
    pub fn with_store(mut self, store: &'a LayeredStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn registry(&self) -> &'a FeatureRegistry {
        self.registry
    }

    /// Whether `name` is enabled. Unknown names are never enabled.
    pub fn enabled(&self, name: &str) -> bool {
        self.explain(name).is_ok_and(|e| e.enabled)
    }

    /// Resolve `name` and report which step decided it.
    pub fn explain(&self, name: &str) -> Result<Enablement> {
        let feature = self.registry.features().require(name)?;
        Ok(self.resolve(feature))
    }

    /// Every feature with its resolved state, sorted by name.
    pub fn status(&self) -> Vec<FeatureStatus> {
        self.registry
            .features()
            .iter()
            .map(|feature| {
                let Enablement { enabled, source } = self.resolve(feature);
                FeatureStatus {
                    name: feature.name.clone(),
                    category: feature.category,
                    enabled,
                    source,
                }
            })
            .collect()
    }

    /// Names of every enabled feature, sorted.
    pub fn enabled_features(&self) -> Vec<String> {
        self.enabled_set()
            .into_iter()
            .map(|f| f.name.clone())
            .collect()
    }

    /// Enable `name` and every dependency it needs.
    ///
    /// The whole dependency closure is planned and checked first: a cycle
    /// anywhere in it, an unregistered dependency, or a conflict between any
    /// planned feature and an enabled (or other planned) feature aborts the
    /// call with no state changed. Enabling a core feature is a no-op.
    pub fn enable(&self, name: &str) -> Result<()> {
        let feature = self.registry.features().require(name)?;
        if feature.is_core() {
            tracing::debug!(feature = name, "Core feature is always enabled");
            return Ok(());
        }

        let plan = self.plan_enable(feature)?;
        {
            let mut state = self.write_state();
            for planned in &plan {
                state.insert(planned.clone(), true);
            }
        }
        tracing::debug!(feature = name, committed = ?plan, "Enabled feature");
        Ok(())
    }

    /// Disable `name`. Dependents stay enabled.
    pub fn disable(&self, name: &str) -> Result<()> {
        let feature = self.registry.features().require(name)?;
        if feature.is_core() {
            return Err(Error::CoreFeature {
                name: name.to_string(),
            });
        }

        self.write_state().insert(name.to_string(), false);
        tracing::debug!(feature = name, "Disabled feature");

        let stranded: Vec<&str> = self
            .registry
            .features()
            .dependents(name)
            .into_iter()
            .filter(|f| self.resolve(f).enabled)
            .map(|f| f.name.as_str())
            .collect();
        if !stranded.is_empty() {
            tracing::warn!(
                feature = name,
                dependents = ?stranded,
                "Disabled feature still has enabled dependents"
            );
        }
        Ok(())
    }

    /// Declared dependencies of `name`; empty for unknown names.
    pub fn dependencies(&self, name: &str) -> Vec<String> {
        self.registry
            .features()
            .get(name)
            .map(|f| f.dependencies.clone())
            .unwrap_or_default()
    }

    /// Features declaring `name` as a dependency, sorted.
    pub fn dependents(&self, name: &str) -> Vec<String> {
        self.registry
            .features()
            .dependents(name)
            .into_iter()
            .map(|f| f.name.clone())
            .collect()
    }

    /// Declared dependencies of `name` that are not currently enabled.
    pub fn missing_deps(&self, name: &str) -> Vec<String> {
        self.dependencies(name)
            .into_iter()
            .filter(|dep| !self.enabled(dep))
            .collect()
    }

    /// Every transitive dependency of `name`, in enable order.
    pub fn transitive_dependencies(&self, name: &str) -> Result<Vec<String>> {
        let mut closure = graph::dependency_closure(self.registry.features(), name)?;
        closure.pop();
        Ok(closure)
    }

    /// Check the whole registry and the current enabled set.
    ///
    /// Reports the first of: a dependency cycle, a dependency or conflict on
    /// an unregistered feature, a preset listing an unregistered feature, or
    /// two enabled features that conflict.
    pub fn validate(&self) -> Result<()> {
        let catalog = self.registry.features();

        for feature in catalog.iter() {
            if let Some(path) = graph::find_cycle(catalog, &feature.name) {
                return Err(Error::CircularDependency { path });
            }
            if let Some(dep) = feature.dependencies.iter().find(|d| !catalog.contains(d)) {
                return Err(Error::UnknownDependency {
                    feature: feature.name.clone(),
                    dependency: dep.clone(),
                });
            }
            if let Some(conflict) = feature.conflicts.iter().find(|c| !catalog.contains(c)) {
                return Err(Error::UnknownConflict {
                    feature: feature.name.clone(),
                    conflict: conflict.clone(),
                });
            }
        }

        for preset in self.registry.presets().all() {
            if let Some(missing) = preset.features.iter().find(|f| !catalog.contains(f)) {
                return Err(Error::UnknownPresetFeature {
                    preset: preset.name.clone(),
                    feature: missing.clone(),
                });
            }
        }

        let enabled = self.enabled_set();
        for (i, feature) in enabled.iter().enumerate() {
            if let Some(other) = enabled[i + 1..]
                .iter()
                .find(|other| feature.conflicts_with_feature(other))
            {
                return Err(Error::Conflict {
                    feature: feature.name.clone(),
                    conflicting: other.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Merge explicit toggles into the runtime state.
    ///
    /// Unknown and core features are skipped with a warning.
    pub fn load_state(&self, saved: &FeatureState) {
        let catalog = self.registry.features();
        let mut state = self.write_state();
        for (name, &enabled) in saved {
            match catalog.get(name) {
                None => tracing::warn!(feature = %name, "Ignoring saved state for unknown feature"),
                Some(f) if f.is_core() => {
                    tracing::warn!(feature = %name, "Ignoring saved state for core feature");
                }
                Some(_) => {
                    state.insert(name.clone(), enabled);
                }
            }
        }
    }

    /// Export every non-core feature whose state differs from its default.
    pub fn save_state(&self) -> FeatureState {
        self.registry
            .features()
            .iter()
            .filter(|f| !f.is_core())
            .filter_map(|f| {
                let enabled = self.resolve(f).enabled;
                (enabled != f.default_enabled()).then(|| (f.name.clone(), enabled))
            })
            .collect()
    }

    /// The explicit toggles set in this process.
    pub fn runtime_state(&self) -> FeatureState {
        self.read_state().clone()
    }

    /// Reset every non-core feature to its default, then enable the preset's
    /// features in order.
    ///
    /// On the first failure the runtime state from before the call is
    /// restored and the error returned.
    pub fn apply_preset(&self, name: &str) -> Result<()> {
        let preset = self.registry.presets().require(name)?;
        let snapshot = self.runtime_state();

        {
            let mut state = self.write_state();
            for feature in self.registry.features().iter().filter(|f| !f.is_core()) {
                state.insert(feature.name.clone(), feature.default_enabled());
            }
        }

        for feature in &preset.features {
            if let Err(e) = self.enable(feature) {
                *self.write_state() = snapshot;
                tracing::warn!(preset = name, feature = %feature, "Preset failed; state restored");
                return Err(e);
            }
        }

        tracing::debug!(preset = name, "Applied preset");
        Ok(())
    }

    /// Write the runtime toggles to `features.<name>` in one store layer.
    ///
    /// Enabled toggles carry their enabled dependencies with them, so a later
    /// process sees the same closure even without this process's environment.
    /// A toggle is removed from the layer instead of written when the layers
    /// below it already resolve to the same state.
    pub fn persist(&self, layer: ConfigLayer) -> Result<()> {
        let store = self.store.ok_or(Error::NoStore)?;
        if !layer.is_writable() {
            return Err(switchyard_config::Error::ReadOnlyLayer { layer }.into());
        }
        let below: Vec<ConfigLayer> = ConfigLayer::FILES
            .into_iter()
            .filter(|l| *l > layer)
            .collect();

        for (name, enabled) in self.persist_plan() {
            let Some(feature) = self.registry.features().get(&name) else {
                continue;
            };
            let key = feature_key(&name);
            let inherited = store
                .get_layered_from(&key, &below)?
                .value
                .and_then(|v| v.as_bool())
                .unwrap_or(feature.default_enabled());
            if enabled == inherited {
                store.unset(layer, &key)?;
            } else {
                store.set(layer, &key, enabled)?;
            }
        }

        tracing::debug!(layer = %layer, "Persisted feature state");
        Ok(())
    }

    /// Runtime toggles plus the enabled dependencies of every enabled toggle.
    fn persist_plan(&self) -> FeatureState {
        let catalog = self.registry.features();
        let runtime = self.runtime_state();
        let mut plan = runtime.clone();

        for name in runtime.iter().filter(|(_, on)| **on).map(|(name, _)| name) {
            let closure = match graph::dependency_closure(catalog, name) {
                Ok(closure) => closure,
                Err(e) => {
                    tracing::warn!(feature = %name, "Not persisting dependencies: {e}");
                    continue;
                }
            };
            for dep in closure {
                let Some(feature) = catalog.get(&dep) else {
                    continue;
                };
                if !feature.is_core() && self.resolve(feature).enabled {
                    plan.entry(dep).or_insert(true);
                }
            }
        }
        plan
    }

    fn resolve(&self, feature: &Feature) -> Enablement {
        if feature.is_core() {
            return Enablement::new(true, EnablementSource::Core);
        }

        let explicit = self.read_state().get(&feature.name).copied();
        if let Some(enabled) = explicit {
            return Enablement::new(enabled, EnablementSource::Runtime);
        }

        if let Some(over) = env_override(&self.env, &feature.name) {
            return Enablement::new(over.enabled, EnablementSource::Environment { var: over.var });
        }

        if let Some((enabled, layer)) = self.persisted(&feature.name) {
            return Enablement::new(enabled, EnablementSource::Persisted { layer });
        }

        Enablement::new(
            feature.default_policy.default_enabled(),
            EnablementSource::Default,
        )
    }

    /// The persisted toggle for `name` in the file layers, if readable.
    fn persisted(&self, name: &str) -> Option<(bool, ConfigLayer)> {
        let store = self.store?;
        let result = match store.get_layered_from(&feature_key(name), &ConfigLayer::FILES) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(feature = name, "Cannot read persisted feature state: {e}");
                return None;
            }
        };

        let value = result.value?;
        match value.as_bool() {
            Some(enabled) => Some((enabled, result.source)),
            None => {
                tracing::warn!(
                    feature = name,
                    layer = %result.source,
                    value = %value,
                    "Ignoring non-boolean persisted feature state"
                );
                None
            }
        }
    }

    /// Features `enable(feature)` would switch on, dependencies first.
    fn plan_enable(&self, feature: &Feature) -> Result<Vec<String>> {
        let catalog = self.registry.features();
        let closure = graph::dependency_closure(catalog, &feature.name)?;
        let enabled = self.enabled_set();

        let mut plan: Vec<&Feature> = Vec::new();
        for name in &closure {
            let candidate = catalog.require(name)?;
            if candidate.is_core() {
                continue;
            }
            let already_on = enabled.iter().any(|f| f.name == candidate.name);
            if already_on && candidate.name != feature.name {
                continue;
            }
            if let Some(other) = enabled
                .iter()
                .chain(plan.iter())
                .find(|other| candidate.conflicts_with_feature(other))
            {
                return Err(Error::Conflict {
                    feature: candidate.name.clone(),
                    conflicting: other.name.clone(),
                });
            }
            plan.push(candidate);
        }

        Ok(plan.into_iter().map(|f| f.name.clone()).collect())
    }

    fn enabled_set(&self) -> Vec<&'a Feature> {
        self.registry
            .features()
            .iter()
            .filter(|f| self.resolve(f).enabled)
            .collect()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, FeatureState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, FeatureState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
