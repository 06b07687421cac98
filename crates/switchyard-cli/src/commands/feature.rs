//! Feature listing, inspection and toggling commands

use colored::Colorize;
use switchyard_config::ConfigLayer;
use switchyard_features::{Category, Enablement, FeatureResolver};

use crate::context::Context;
use crate::error::{CliError, Result};

fn category_label(category: Category) -> &'static str {
    match category {
        Category::Core => "Core",
        Category::Optional => "Optional",
        Category::Integration => "Integrations",
    }
}

fn state_label(enablement: &Enablement) -> colored::ColoredString {
    if enablement.enabled {
        "on ".green()
    } else {
        "off".dimmed()
    }
}

/// Run the `feature list` command
pub fn run_feature_list(ctx: &Context, category: Option<Category>, json: bool) -> Result<()> {
    let resolver = ctx.resolver();
    let catalog = ctx.registry.features();

    if json {
        let mut rows = Vec::new();
        for feature in catalog.iter().filter(|f| category.is_none_or(|c| f.category == c)) {
            let enablement = resolver.explain(&feature.name)?;
            rows.push(serde_json::json!({
                "name": feature.name,
                "description": feature.description,
                "category": feature.category,
                "default_policy": feature.default_policy,
                "dependencies": feature.dependencies,
                "conflicts": feature.conflicts,
                "enabled": enablement.enabled,
                "source": enablement.source,
            }));
        }
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{}", "Features".bold());
    println!();

    for cat in Category::ALL {
        if category.is_some_and(|c| c != cat) {
            continue;
        }
        let features = catalog.by_category(cat);
        if features.is_empty() {
            continue;
        }

        println!("{}:", category_label(cat).cyan().bold());
        for feature in features {
            let enablement = resolver.explain(&feature.name)?;
            println!(
                "  {} {:<20} {}",
                state_label(&enablement),
                feature.name.green(),
                feature.description.dimmed()
            );
        }
        println!();
    }

    let enabled = resolver.enabled_features().len();
    println!(
        "{} {} of {} features enabled. Use {} to see why.",
        "Total:".dimmed(),
        enabled,
        catalog.len(),
        "switchyard feature status <name>".cyan()
    );
    Ok(())
}

/// Run the `feature status` command
pub fn run_feature_status(ctx: &Context, name: Option<&str>, json: bool) -> Result<()> {
    let resolver = ctx.resolver();

    let Some(name) = name else {
        let status = resolver.status();
        if json {
            println!("{}", serde_json::to_string_pretty(&status)?);
            return Ok(());
        }
        for row in status {
            let mark = if row.enabled { "on ".green() } else { "off".dimmed() };
            println!("  {} {:<20} {}", mark, row.name, row.source.to_string().dimmed());
        }
        return Ok(());
    };

    let enablement = resolver.explain(name)?;
    let missing = resolver.missing_deps(name);
    if json {
        let output = serde_json::json!({
            "name": name,
            "enabled": enablement.enabled,
            "source": enablement.source,
            "missing_dependencies": missing,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let state = if enablement.enabled {
        "enabled".green()
    } else {
        "disabled".red()
    };
    println!("{} is {} ({})", name.bold(), state, enablement.source);
    if enablement.enabled && !missing.is_empty() {
        println!(
            "  {} missing dependencies: {}",
            "warning:".yellow().bold(),
            missing.join(", ")
        );
    }
    Ok(())
}

/// Run the `feature enable` command
pub fn run_feature_enable(ctx: &Context, name: &str, persist: Option<ConfigLayer>) -> Result<()> {
    let resolver = ctx.resolver();
    let before = resolver.enabled_features();

    resolver.enable(name)?;

    let newly: Vec<String> = resolver
        .enabled_features()
        .into_iter()
        .filter(|f| !before.contains(f))
        .collect();
    if newly.is_empty() {
        println!("{} {} is already enabled", "=".dimmed(), name.bold());
    }
    for feature in &newly {
        println!("{} Enabled {}", "+".green(), feature);
    }

    finish(ctx, &resolver, persist)
}

/// Run the `feature disable` command
pub fn run_feature_disable(ctx: &Context, name: &str, persist: Option<ConfigLayer>) -> Result<()> {
    let resolver = ctx.resolver();

    resolver.disable(name)?;
    println!("{} Disabled {}", "-".red(), name.bold());

    let stranded: Vec<String> = resolver
        .dependents(name)
        .into_iter()
        .filter(|d| resolver.enabled(d))
        .collect();
    if !stranded.is_empty() {
        println!(
            "  {} still enabled and depending on {}: {}",
            "warning:".yellow().bold(),
            name,
            stranded.join(", ")
        );
    }

    finish(ctx, &resolver, persist)
}

/// Run the `feature deps` command
pub fn run_feature_deps(ctx: &Context, name: &str) -> Result<()> {
    let resolver = ctx.resolver();
    let feature = ctx
        .registry
        .features()
        .get(name)
        .ok_or_else(|| {
            CliError::user(format!(
                "Unknown feature '{name}'. Use 'switchyard feature list' to see available features."
            ))
        })?;

    println!("{}", feature.name.bold());
    print_list("Depends on", &resolver.dependencies(name));
    print_list("All dependencies", &resolver.transitive_dependencies(name)?);
    print_list("Needed by", &resolver.dependents(name));
    print_list("Conflicts with", &feature.conflicts);

    let missing = resolver.missing_deps(name);
    if !missing.is_empty() {
        print_list("Not enabled", &missing);
    }
    Ok(())
}

/// Run the `feature validate` command
pub fn run_feature_validate(ctx: &Context) -> Result<()> {
    ctx.resolver().validate()?;
    println!(
        "{} {} features and {} presets are consistent",
        "OK".green().bold(),
        ctx.registry.features().len(),
        ctx.registry.presets().len()
    );
    Ok(())
}

fn print_list(label: &str, items: &[String]) {
    let label = format!("{label}:");
    if items.is_empty() {
        println!("  {:<18} {}", label.dimmed(), "(none)".dimmed());
    } else {
        println!("  {:<18} {}", label.dimmed(), items.join(", "));
    }
}

/// Persist when asked, otherwise remind that runtime state ends with the process.
pub(crate) fn finish(
    ctx: &Context,
    resolver: &FeatureResolver<'_>,
    persist: Option<ConfigLayer>,
) -> Result<()> {
    let Some(layer) = persist else {
        println!(
            "{}",
            "Not persisted; pass --persist user to keep this change.".dimmed()
        );
        return Ok(());
    };

    resolver.persist(layer)?;
    println!("{} Saved to the {} layer", "+".green(), layer);

    for (name, decided) in still_overridden(ctx, resolver)? {
        let state = if decided.enabled { "enabled" } else { "disabled" };
        println!(
            "  {} {} stays {} in new sessions: {} still overrides it",
            "note:".yellow().bold(),
            name,
            state,
            decided.source
        );
    }
    Ok(())
}

/// Features whose saved state a fresh session would not see, with what
/// decides them there instead.
pub(crate) fn still_overridden(
    ctx: &Context,
    resolver: &FeatureResolver<'_>,
) -> Result<Vec<(String, Enablement)>> {
    let fresh = ctx.resolver();
    let mut overridden = Vec::new();
    for feature in ctx.registry.features().iter() {
        let decided = fresh.explain(&feature.name)?;
        if decided.enabled != resolver.enabled(&feature.name) {
            overridden.push((feature.name.clone(), decided));
        }
    }
    Ok(overridden)
}
