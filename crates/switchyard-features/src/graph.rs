//! Dependency walks over the feature catalog
//!
//! Edges point from dependent to dependency. Walks are depth-first and carry
//! the current path, so a cycle is reported as the ordered path that closes
//! it: `a -> b -> c -> b`.

use std::collections::BTreeSet;

use crate::{Error, FeatureCatalog, Result};

/// Dependency closure of `name` in enable order: dependencies first, `name`
/// last, each feature once.
///
/// # Errors
///
/// - [`Error::UnknownFeature`] if `name` or any transitive dependency is not
///   registered
/// - [`Error::CircularDependency`] if the walk revisits a feature on its path
pub fn dependency_closure(catalog: &FeatureCatalog, name: &str) -> Result<Vec<String>> {
    let mut walk = Walk::new(catalog, true);
    walk.visit(name)?;
    Ok(walk.order)
}

/// The first cycle reachable from `name`, ignoring unregistered dependencies.
pub fn find_cycle(catalog: &FeatureCatalog, name: &str) -> Option<Vec<String>> {
    let mut walk = Walk::new(catalog, false);
    match walk.visit(name) {
        Err(Error::CircularDependency { path }) => Some(path),
        _ => None,
    }
}

struct Walk<'a> {
    catalog: &'a FeatureCatalog,
    strict: bool,
    path: Vec<String>,
    done: BTreeSet<String>,
    order: Vec<String>,
}

impl<'a> Walk<'a> {
    fn new(catalog: &'a FeatureCatalog, strict: bool) -> Self {
        Self {
            catalog,
            strict,
            path: Vec::new(),
            done: BTreeSet::new(),
            order: Vec::new(),
        }
    }

    fn visit(&mut self, name: &str) -> Result<()> {
        if self.path.iter().any(|p| p == name) {
            let mut path = self.path.clone();
            path.push(name.to_string());
            return Err(Error::CircularDependency { path });
        }
        if self.done.contains(name) {
            return Ok(());
        }

        let Some(feature) = self.catalog.get(name) else {
            return if self.strict {
                Err(Error::unknown_feature(name))
            } else {
                Ok(())
            };
        };

        self.path.push(name.to_string());
        for dep in &feature.dependencies {
            self.visit(dep)?;
        }
        self.path.pop();

        self.done.insert(name.to_string());
        self.order.push(name.to_string());
        Ok(())
    }
}
