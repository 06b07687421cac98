//! Preset commands

use colored::Colorize;
use switchyard_config::ConfigLayer;

use crate::commands::feature::finish;
use crate::context::Context;
use crate::error::Result;

/// Run the `preset list` command
pub fn run_preset_list(ctx: &Context) -> Result<()> {
    println!("{}", "Available Presets".bold());
    println!();

    for preset in ctx.registry.presets().all() {
        println!("  {:<12} {}", preset.name.green(), preset.description);
        if preset.features.is_empty() {
            println!("  {:<12} {}", "", "(core features only)".dimmed());
        } else {
            println!("  {:<12} {}", "", preset.features.join(", ").dimmed());
        }
    }

    println!();
    println!("Apply one with {}.", "switchyard preset apply <name>".cyan());
    Ok(())
}

/// Run the `preset apply` command
pub fn run_preset_apply(ctx: &Context, name: &str, persist: Option<ConfigLayer>) -> Result<()> {
    let resolver = ctx.resolver();
    resolver.apply_preset(name)?;

    println!("{} Applied preset {}", "+".green(), name.bold());
    println!("  {}", resolver.enabled_features().join(", "));

    finish(ctx, &resolver, persist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use switchyard_config::{Environment, LayerPaths};
    use switchyard_test_utils::TestWorkspace;

    #[test]
    fn apply_and_persist_round_trips() {
        let ws = TestWorkspace::new();
        let paths = LayerPaths::new(ws.working_dir()).with_config_dir(ws.config_home());
        let ctx = Context::new(paths, Environment::empty());

        run_preset_apply(&ctx, "developer", Some(ConfigLayer::User)).unwrap();

        let resolver = ctx.resolver();
        for name in ["completions", "hooks", "templates", "github_cli"] {
            assert!(resolver.enabled(name), "{name} should be persisted");
        }
        run_preset_list(&ctx).unwrap();
    }

    #[test]
    fn unknown_preset_fails() {
        let ws = TestWorkspace::new();
        let ctx = Context::new(LayerPaths::new(ws.working_dir()), Environment::empty());

        let err = run_preset_apply(&ctx, "nightly", None).unwrap_err();
        assert!(matches!(err, CliError::Features(_)));
        assert!(err.to_string().contains("nightly"));
    }
}
