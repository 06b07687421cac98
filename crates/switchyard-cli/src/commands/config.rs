//! Layered configuration commands

use colored::Colorize;
use switchyard_config::{ConfigLayer, ConfigValue};

use crate::context::Context;
use crate::error::{CliError, Result};

/// Run the `config get` command
pub fn run_config_get(ctx: &Context, key: &str, direct: bool, json: bool) -> Result<()> {
    if direct {
        let value = ctx.store.get(key)?;
        if json {
            let output = serde_json::json!({
                "key": key,
                "value": value,
                "source": ConfigLayer::User,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", value.render());
        }
        return Ok(());
    }

    let result = ctx.store.get_layered(key)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    if !result.is_found() {
        return Err(CliError::user(format!("{key} is not set in any layer")));
    }
    println!("{}", result.as_string());
    Ok(())
}

/// Run the `config set` command
pub fn run_config_set(
    ctx: &Context,
    key: &str,
    raw: &str,
    layer: ConfigLayer,
    as_string: bool,
) -> Result<()> {
    let value = if as_string {
        ConfigValue::from(raw)
    } else {
        ConfigValue::infer(raw)
    };

    ctx.store.set(layer, key, value.clone())?;
    let path = ctx.store.layer_path(layer)?;
    println!(
        "{} Set {} = {} in the {} layer ({})",
        "+".green(),
        key.bold(),
        value,
        layer,
        path.as_str().dimmed()
    );

    let effective = ctx.store.get_layered(key)?;
    if effective.source < layer {
        println!(
            "  {} the {} layer still overrides this value",
            "note:".yellow().bold(),
            effective.source
        );
    }
    Ok(())
}

/// Run the `config unset` command
pub fn run_config_unset(ctx: &Context, key: &str, layer: ConfigLayer) -> Result<()> {
    if ctx.store.unset(layer, key)? {
        println!("{} Removed {} from the {} layer", "-".red(), key.bold(), layer);
    } else {
        println!("{} {} was not set in the {} layer", "=".dimmed(), key, layer);
    }
    Ok(())
}

/// Run the `config explain` command
pub fn run_config_explain(ctx: &Context, key: &str) -> Result<()> {
    let candidates = ctx.store.explain(key)?;

    println!("{}", key.bold());
    if candidates.is_empty() {
        println!("  {}", "(not set in any layer)".dimmed());
        return Ok(());
    }

    for (i, candidate) in candidates.iter().enumerate() {
        let marker = if i == 0 { "*".green() } else { " ".normal() };
        let origin = candidate.origin.as_deref().unwrap_or_default();
        println!(
            "  {} {:<8} {:<24} {}",
            marker,
            candidate.source.to_string(),
            candidate.as_string(),
            origin.dimmed()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_config::{Environment, LayerPaths};
    use switchyard_test_utils::TestWorkspace;

    fn context(ws: &TestWorkspace) -> Context {
        let paths = LayerPaths::new(ws.working_dir()).with_config_dir(ws.config_home());
        Context::new(paths, Environment::empty())
    }

    #[test]
    fn set_infers_types_unless_string() {
        let ws = TestWorkspace::new();
        let ctx = context(&ws);

        run_config_set(&ctx, "vault.timeout", "30", ConfigLayer::User, false).unwrap();
        run_config_set(&ctx, "shell.prompt", "true", ConfigLayer::User, true).unwrap();

        assert_eq!(ctx.store.get("vault.timeout").unwrap(), ConfigValue::Integer(30));
        assert_eq!(ctx.store.get("shell.prompt").unwrap(), ConfigValue::from("true"));
    }

    #[test]
    fn set_to_read_only_layer_fails() {
        let ws = TestWorkspace::new();
        let ctx = context(&ws);

        let err = run_config_set(&ctx, "k", "v", ConfigLayer::Environment, false).unwrap_err();
        assert!(matches!(
            err,
            CliError::Config(switchyard_config::Error::ReadOnlyLayer { .. })
        ));
    }

    #[test]
    fn layered_get_of_missing_key_is_user_error() {
        let ws = TestWorkspace::new();
        let ctx = context(&ws);

        assert!(matches!(
            run_config_get(&ctx, "nothing.here", false, false),
            Err(CliError::User { .. })
        ));
        run_config_get(&ctx, "nothing.here", false, true).unwrap();
        run_config_get(&ctx, "vault.backend", false, false).unwrap();
    }

    #[test]
    fn unset_and_explain() {
        let ws = TestWorkspace::new();
        ws.write_user("[vault]\nbackend = \"bitwarden\"\n");
        let ctx = context(&ws);

        run_config_explain(&ctx, "vault.backend").unwrap();
        run_config_unset(&ctx, "vault.backend", ConfigLayer::User).unwrap();
        assert!(ctx.store.get("vault.backend").is_err());
        run_config_unset(&ctx, "vault.backend", ConfigLayer::User).unwrap();
    }
}
