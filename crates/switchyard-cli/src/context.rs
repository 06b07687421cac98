//! Per-invocation state shared by every command

use std::path::Path;

use colored::Colorize;
use switchyard_config::{Environment, LayerPaths, LayeredStore};
use switchyard_features::{FeatureRegistry, FeatureResolver, builtin_config_defaults};

/// The config store and feature registry for one CLI invocation.
#[derive(Debug)]
pub struct Context {
    pub store: LayeredStore,
    pub registry: FeatureRegistry,
    env: Environment,
}

impl Context {
    pub fn new(paths: LayerPaths, env: Environment) -> Self {
        let store = LayeredStore::new(paths, env.clone()).with_defaults(builtin_config_defaults());
        Self {
            store,
            registry: FeatureRegistry::with_builtins(),
            env,
        }
    }

    /// Platform layer locations searched from `cwd`, and the process environment.
    pub fn from_process(cwd: &Path) -> Self {
        let env = Environment::from_process();
        let paths = LayerPaths::platform(cwd, &env);
        Self::new(paths, env)
    }

    /// A fresh resolver backed by this context's store.
    pub fn resolver(&self) -> FeatureResolver<'_> {
        FeatureResolver::new(&self.registry, self.env.clone()).with_store(&self.store)
    }

    /// Print malformed-layer warnings collected while the command ran.
    pub fn report_warnings(&self) {
        for warning in self.store.warnings() {
            eprintln!("{} {}", "warning:".yellow().bold(), warning);
        }
    }
}
