//! Built-in features, presets and config defaults
//!
//! Every built-in catalog entry is defined here; the catalogs, the CLI and
//! the default config layer all derive from these functions.

use switchyard_config::{ConfigTable, ConfigValue};

use crate::{Category, DefaultPolicy, Feature, Preset};

/// Number of built-in features.
pub const BUILTIN_FEATURE_COUNT: usize = 14;

/// Returns all built-in features.
pub fn builtin_features() -> Vec<Feature> {
    vec![
        // Core (2)
        Feature::new("shell", "Shell environment setup", Category::Core),
        Feature::new("config", "Layered configuration", Category::Core),
        // Optional (6)
        Feature::new("hooks", "Git hook management", Category::Optional),
        Feature::new("templates", "Project templates", Category::Optional),
        Feature::new("plugins", "Third-party plugin loading", Category::Optional).depends_on("hooks"),
        Feature::new("vault", "Secret storage", Category::Optional),
        Feature::new("completions", "Shell completions", Category::Optional).depends_on("shell"),
        Feature::new("prompt", "Prompt customization", Category::Optional)
            .with_policy(DefaultPolicy::AlwaysOn),
        // Integrations (6)
        integration("vault_1password", "1Password secret backend")
            .depends_on("vault")
            .conflicts_with("vault_bitwarden"),
        integration("vault_bitwarden", "Bitwarden secret backend")
            .depends_on("vault")
            .conflicts_with("vault_1password"),
        integration("claude_integration", "Claude Code project setup")
            .depends_on("templates")
            .depends_on("hooks"),
        integration("homebrew", "Homebrew package sync"),
        integration("github_cli", "GitHub CLI integration"),
        integration("aws_cli", "AWS CLI profile management"),
    ]
}

fn integration(name: &str, description: &str) -> Feature {
    Feature::new(name, description, Category::Integration).with_policy(DefaultPolicy::EnvGated)
}

/// Returns all built-in presets.
pub fn builtin_presets() -> Vec<Preset> {
    vec![
        Preset::new("minimal", "Core features only"),
        Preset::new("developer", "Everyday development setup").with_features([
            "completions",
            "hooks",
            "templates",
            "github_cli",
        ]),
        Preset::new("full", "Every optional feature and the common integrations").with_features([
            "hooks",
            "templates",
            "plugins",
            "vault",
            "completions",
            "prompt",
            "vault_1password",
            "claude_integration",
            "homebrew",
            "github_cli",
            "aws_cli",
        ]),
    ]
}

/// The compiled-in default config layer.
pub fn builtin_config_defaults() -> ConfigTable {
    let section = |key: &str, value: &str| {
        ConfigValue::Table(ConfigTable::from([(key.to_string(), ConfigValue::from(value))]))
    };
    ConfigTable::from([
        ("vault".to_string(), section("backend", "none")),
        ("shell".to_string(), section("prompt", "default")),
    ])
}
