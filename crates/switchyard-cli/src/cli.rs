//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use switchyard_config::ConfigLayer;
use switchyard_features::Category;

/// Switchyard - Toggle features and inspect layered configuration
#[derive(Parser, Debug)]
#[command(name = "switchyard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Inspect and toggle features
    Feature {
        #[command(subcommand)]
        action: FeatureAction,
    },

    /// List and apply feature presets
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },

    /// Read and write layered configuration
    ///
    /// Layers, highest priority first: env, project, machine, user, default.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum FeatureAction {
    /// List features and whether they are enabled
    List {
        /// Only show one category (core, optional, integration)
        #[arg(short, long)]
        category: Option<Category>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show why a feature is on or off (all features when no name is given)
    Status {
        name: Option<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Enable a feature and its dependencies
    ///
    /// Examples:
    ///   switchyard feature enable plugins                 # Check only
    ///   switchyard feature enable plugins --persist user  # Keep it enabled
    Enable {
        name: String,

        /// Write the result to this config layer (project, machine or user)
        #[arg(long, value_name = "LAYER")]
        persist: Option<ConfigLayer>,
    },

    /// Disable a feature (dependents stay enabled)
    Disable {
        name: String,

        /// Write the result to this config layer (project, machine or user)
        #[arg(long, value_name = "LAYER")]
        persist: Option<ConfigLayer>,
    },

    /// Show a feature's dependencies and dependents
    Deps { name: String },

    /// Check the catalog for cycles, unknown references and active conflicts
    Validate,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PresetAction {
    /// List available presets
    List,

    /// Reset features to their defaults and enable a preset's features
    Apply {
        name: String,

        /// Write the result to this config layer (project, machine or user)
        #[arg(long, value_name = "LAYER")]
        persist: Option<ConfigLayer>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the effective value of a key
    Get {
        /// Dot-separated key, e.g. vault.backend
        key: String,

        /// Read the user layer only, ignoring every other layer
        #[arg(long)]
        direct: bool,

        /// Output as JSON, including the source layer
        #[arg(long)]
        json: bool,
    },

    /// Write a value to one layer
    ///
    /// Values are typed: true/false become booleans and numbers become
    /// numbers unless --string is given.
    Set {
        key: String,
        value: String,

        /// Layer to write (project, machine or user)
        #[arg(short, long, default_value = "user")]
        layer: ConfigLayer,

        /// Store the value as a string even if it looks like a bool or number
        #[arg(long)]
        string: bool,
    },

    /// Remove a key from one layer
    Unset {
        key: String,

        /// Layer to modify (project, machine or user)
        #[arg(short, long, default_value = "user")]
        layer: ConfigLayer,
    },

    /// Show every layer's value for a key, highest priority first
    Explain { key: String },
}
