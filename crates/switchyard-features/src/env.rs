//! Environment overrides for feature enablement
//!
//! Two declared variable families can force a feature on or off:
//!
//! - the direct flag `SWITCHYARD_FEATURES_<NAME>`, the config store's
//!   environment name for the key `features.<name>`
//! - legacy inverted `SKIP_*` variables, where `SKIP_HOOKS=true` turns the
//!   `hooks` feature off
//!
//! The direct flag is checked first.

use serde::Serialize;
use switchyard_config::{Environment, env_var_name, parse_bool};

/// Config section holding persisted feature toggles.
pub const FEATURES_SECTION: &str = "features";

/// A legacy variable whose truthy value disables a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacySkipVar {
    pub var: &'static str,
    pub feature: &'static str,
}

/// The legacy inverted variable family.
pub const LEGACY_SKIP_VARS: &[LegacySkipVar] = &[
    LegacySkipVar { var: "SKIP_HOOKS", feature: "hooks" },
    LegacySkipVar { var: "SKIP_VAULT", feature: "vault" },
    LegacySkipVar { var: "SKIP_PLUGINS", feature: "plugins" },
    LegacySkipVar { var: "SKIP_TEMPLATES", feature: "templates" },
    LegacySkipVar { var: "SKIP_CLAUDE", feature: "claude_integration" },
    LegacySkipVar { var: "SKIP_HOMEBREW", feature: "homebrew" },
];

/// The config key persisting a feature's toggle: `features.<name>`.
pub fn feature_key(name: &str) -> String {
    format!("{FEATURES_SECTION}.{name}")
}

/// The direct flag variable for a feature.
pub fn flag_var(name: &str) -> String {
    env_var_name(&feature_key(name))
}

/// The legacy skip variable mapped to a feature, if any.
pub fn legacy_skip_var(name: &str) -> Option<&'static str> {
    LEGACY_SKIP_VARS
        .iter()
        .find(|entry| entry.feature == name)
        .map(|entry| entry.var)
}

/// An environment variable that decided a feature's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvOverride {
    pub var: String,
    pub enabled: bool,
}

/// The environment's verdict on feature `name`, if it has one.
///
/// Empty values count as unset. Unparseable direct flags are ignored with a
/// warning; a legacy variable only overrides when it is truthy.
pub fn env_override(env: &Environment, name: &str) -> Option<EnvOverride> {
    let var = flag_var(name);
    if let Some(raw) = env.get(&var).filter(|v| !v.trim().is_empty()) {
        match parse_bool(raw) {
            Some(enabled) => return Some(EnvOverride { var, enabled }),
            None => tracing::warn!(var = %var, value = raw, "Ignoring non-boolean feature flag"),
        }
    }

    let legacy = legacy_skip_var(name)?;
    env.get(legacy)
        .and_then(parse_bool)
        .filter(|skip| *skip)
        .map(|_| EnvOverride {
            var: legacy.to_string(),
            enabled: false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn env(pairs: &[(&str, &str)]) -> Environment {
        Environment::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn flag_var_uses_store_transform() {
        assert_eq!(flag_var("vault_1password"), "SWITCHYARD_FEATURES_VAULT_1PASSWORD");
        assert_eq!(feature_key("hooks"), "features.hooks");
    }

    #[rstest]
    #[case("true", true)]
    #[case("1", true)]
    #[case("ON", true)]
    #[case("false", false)]
    #[case("no", false)]
    fn direct_flag_parses_booleans(#[case] value: &str, #[case] expected: bool) {
        let result = env_override(&env(&[("SWITCHYARD_FEATURES_HOOKS", value)]), "hooks").unwrap();
        assert_eq!(result.enabled, expected);
        assert_eq!(result.var, "SWITCHYARD_FEATURES_HOOKS");
    }

    #[test]
    fn legacy_skip_disables() {
        let result = env_override(&env(&[("SKIP_HOOKS", "true")]), "hooks").unwrap();
        assert_eq!(
            result,
            EnvOverride {
                var: "SKIP_HOOKS".into(),
                enabled: false
            }
        );
    }

    #[test]
    fn falsy_legacy_skip_is_no_override() {
        assert!(env_override(&env(&[("SKIP_HOOKS", "false")]), "hooks").is_none());
    }

    #[test]
    fn direct_flag_wins_over_legacy() {
        let vars = env(&[("SWITCHYARD_FEATURES_HOOKS", "true"), ("SKIP_HOOKS", "true")]);
        assert!(env_override(&vars, "hooks").unwrap().enabled);
    }

    #[test]
    fn unparseable_flag_falls_back_to_legacy() {
        let vars = env(&[("SWITCHYARD_FEATURES_VAULT", "maybe"), ("SKIP_VAULT", "1")]);
        let result = env_override(&vars, "vault").unwrap();
        assert_eq!(result.var, "SKIP_VAULT");
        assert!(!result.enabled);
    }

    #[test]
    fn legacy_table_maps_claude() {
        assert_eq!(legacy_skip_var("claude_integration"), Some("SKIP_CLAUDE"));
        assert_eq!(legacy_skip_var("aws_cli"), None);
    }

    #[test]
    fn no_variables_no_override() {
        assert!(env_override(&Environment::empty(), "hooks").is_none());
        assert!(env_override(&env(&[("SWITCHYARD_FEATURES_HOOKS", "")]), "hooks").is_none());
    }
}
