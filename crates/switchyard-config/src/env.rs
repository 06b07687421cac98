//! Environment snapshot and the environment-layer naming transform

use std::collections::BTreeMap;

/// Prefix reserved for every switchyard environment variable.
pub const ENV_PREFIX: &str = "SWITCHYARD_";

/// Derive the environment variable consulted for a dotted config key.
///
/// Dots (and dashes, which cannot appear in portable variable names) become
/// underscores, the result is uppercased and prefixed:
/// `vault.backend` -> `SWITCHYARD_VAULT_BACKEND`.
pub fn env_var_name(key: &str) -> String {
    format!("{ENV_PREFIX}{}", key.replace(['.', '-'], "_").to_uppercase())
}

/// A snapshot of environment variables.
///
/// The store and the feature resolver never read the process environment
/// directly; they read through this snapshot so precedence rules can be
/// exercised with fabricated environments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// An environment with no variables set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Build an environment from explicit name/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.vars.remove(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("vault.backend", "SWITCHYARD_VAULT_BACKEND")]
    #[case("features.claude_integration", "SWITCHYARD_FEATURES_CLAUDE_INTEGRATION")]
    #[case("shell.prompt-style", "SWITCHYARD_SHELL_PROMPT_STYLE")]
    #[case("editor", "SWITCHYARD_EDITOR")]
    fn env_var_name_transform(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(env_var_name(key), expected);
    }

    #[test]
    fn snapshot_is_isolated_from_later_changes() {
        let mut env = Environment::from_pairs([("SWITCHYARD_EDITOR", "vim")]);
        let snapshot = env.clone();
        env.set("SWITCHYARD_EDITOR", "hx");

        assert_eq!(snapshot.get("SWITCHYARD_EDITOR"), Some("vim"));
        assert_eq!(env.get("SWITCHYARD_EDITOR"), Some("hx"));
        assert_eq!(env.remove("SWITCHYARD_EDITOR").as_deref(), Some("hx"));
        assert!(env.is_empty());
    }
}
