//! Switchyard CLI
//!
//! Toggle features and inspect the layered configuration they are stored in.

mod cli;
mod commands;
mod context;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands, ConfigAction, FeatureAction, PresetAction};
use context::Context;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        println!("{} feature and configuration manager", "switchyard".green().bold());
        println!();
        println!("Run {} for available commands.", "switchyard --help".cyan());
        return Ok(());
    };

    let cwd = std::env::current_dir()?;
    let ctx = Context::from_process(&cwd);
    let result = execute_command(&ctx, command);
    ctx.report_warnings();
    result
}

/// DEBUG to stderr with `--verbose`, otherwise only what `RUST_LOG` asks for.
fn init_tracing(verbose: bool) {
    let installed = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber).map_err(|e| e.to_string())
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| e.to_string())
    };

    match installed {
        Ok(()) => tracing::debug!("Verbose mode enabled"),
        Err(e) => eprintln!("{} cannot install logger: {e}", "warning:".yellow().bold()),
    }
}

fn execute_command(ctx: &Context, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Feature { action } => match action {
            FeatureAction::List { category, json } => {
                commands::run_feature_list(ctx, category, json)
            }
            FeatureAction::Status { name, json } => {
                commands::run_feature_status(ctx, name.as_deref(), json)
            }
            FeatureAction::Enable { name, persist } => {
                commands::run_feature_enable(ctx, &name, persist)
            }
            FeatureAction::Disable { name, persist } => {
                commands::run_feature_disable(ctx, &name, persist)
            }
            FeatureAction::Deps { name } => commands::run_feature_deps(ctx, &name),
            FeatureAction::Validate => commands::run_feature_validate(ctx),
        },
        Commands::Preset { action } => match action {
            PresetAction::List => commands::run_preset_list(ctx),
            PresetAction::Apply { name, persist } => {
                commands::run_preset_apply(ctx, &name, persist)
            }
        },
        Commands::Config { action } => match action {
            ConfigAction::Get { key, direct, json } => {
                commands::run_config_get(ctx, &key, direct, json)
            }
            ConfigAction::Set {
                key,
                value,
                layer,
                string,
            } => commands::run_config_set(ctx, &key, &value, layer, string),
            ConfigAction::Unset { key, layer } => commands::run_config_unset(ctx, &key, layer),
            ConfigAction::Explain { key } => commands::run_config_explain(ctx, &key),
        },
    }
}
