//! Command implementations for switchyard-cli

pub mod config;
pub mod feature;
pub mod preset;

pub use config::{run_config_explain, run_config_get, run_config_set, run_config_unset};
pub use feature::{
    run_feature_deps, run_feature_disable, run_feature_enable, run_feature_list,
    run_feature_status, run_feature_validate,
};
pub use preset::{run_preset_apply, run_preset_list};
