//! Feature state persisted through the layered config store

use pretty_assertions::assert_eq;
use switchyard_config::{ConfigLayer, ConfigValue, Environment, LayerPaths, LayeredStore};
use switchyard_features::{EnablementSource, FeatureRegistry, FeatureResolver};
use switchyard_test_utils::TestWorkspace;

fn open_store(ws: &TestWorkspace) -> LayeredStore {
    let paths = LayerPaths::new(ws.working_dir())
        .with_user_file(ws.user_file())
        .with_machine_file(ws.machine_file());
    LayeredStore::new(paths, Environment::empty())
}

#[test]
fn persisted_toggle_is_consulted_after_environment() {
    let ws = TestWorkspace::new();
    ws.write_user("[features]\nhooks = true\nvault = \"yes\"\n");
    let store = open_store(&ws);
    let registry = FeatureRegistry::with_builtins();
    let env = Environment::from_pairs([("SKIP_VAULT", "true")]);
    let resolver = FeatureResolver::new(&registry, env).with_store(&store);

    let hooks = resolver.explain("hooks").unwrap();
    assert!(hooks.enabled);
    assert_eq!(
        hooks.source,
        EnablementSource::Persisted {
            layer: ConfigLayer::User
        }
    );

    let vault = resolver.explain("vault").unwrap();
    assert!(!vault.enabled);
    assert_eq!(
        vault.source,
        EnablementSource::Environment {
            var: "SKIP_VAULT".into()
        }
    );
}

#[test]
fn project_layer_outranks_user_layer() {
    let ws = TestWorkspace::new();
    ws.write_user("[features]\ntemplates = true\n");
    ws.write_project("[features]\ntemplates = false\n");
    let store = open_store(&ws);
    let registry = FeatureRegistry::with_builtins();
    let resolver = FeatureResolver::new(&registry, Environment::empty()).with_store(&store);

    let templates = resolver.explain("templates").unwrap();
    assert!(!templates.enabled);
    assert_eq!(
        templates.source,
        EnablementSource::Persisted {
            layer: ConfigLayer::Project
        }
    );
}

#[test]
fn non_boolean_persisted_value_falls_back_to_default() {
    let ws = TestWorkspace::new();
    ws.write_user("[features]\nprompt = \"sometimes\"\n");
    let store = open_store(&ws);
    let registry = FeatureRegistry::with_builtins();
    let resolver = FeatureResolver::new(&registry, Environment::empty()).with_store(&store);

    let prompt = resolver.explain("prompt").unwrap();
    assert!(prompt.enabled);
    assert_eq!(prompt.source, EnablementSource::Default);
}

#[test]
fn malformed_layer_does_not_break_resolution() {
    let ws = TestWorkspace::new();
    ws.write_project("[features\nhooks = ");
    ws.write_user("[features]\nhooks = true\n");
    let store = open_store(&ws);
    let registry = FeatureRegistry::with_builtins();
    let resolver = FeatureResolver::new(&registry, Environment::empty()).with_store(&store);

    assert!(resolver.enabled("hooks"));
    assert_eq!(store.warnings().len(), 1);
}

#[test]
fn persist_writes_non_defaults_and_clears_defaults() {
    let ws = TestWorkspace::new();
    ws.write_user("# my settings\n[features]\nvault = true\n");
    let store = open_store(&ws);
    let registry = FeatureRegistry::with_builtins();
    let resolver = FeatureResolver::new(&registry, Environment::empty()).with_store(&store);

    resolver.enable("plugins").unwrap();
    resolver.disable("vault").unwrap();
    resolver.disable("prompt").unwrap();
    resolver.persist(ConfigLayer::User).unwrap();

    assert_eq!(store.get("features.plugins").unwrap(), ConfigValue::Bool(true));
    assert_eq!(store.get("features.hooks").unwrap(), ConfigValue::Bool(true));
    assert_eq!(store.get("features.prompt").unwrap(), ConfigValue::Bool(false));
    assert!(store.get("features.vault").is_err());
    assert!(ws.read(&ws.user_file()).starts_with("# my settings"));

    let fresh = FeatureResolver::new(&registry, Environment::empty()).with_store(&store);
    assert_eq!(fresh.enabled_features(), resolver.enabled_features());
}

#[test]
fn persist_to_read_only_layer_fails() {
    let ws = TestWorkspace::new();
    let store = open_store(&ws);
    let registry = FeatureRegistry::with_builtins();
    let resolver = FeatureResolver::new(&registry, Environment::empty()).with_store(&store);
    resolver.enable("hooks").unwrap();

    let err = resolver.persist(ConfigLayer::Environment).unwrap_err();
    assert!(matches!(
        err,
        switchyard_features::Error::Config(switchyard_config::Error::ReadOnlyLayer { .. })
    ));
}

#[test]
fn persisted_preset_survives_new_process() {
    let ws = TestWorkspace::new();
    let store = open_store(&ws);
    let registry = FeatureRegistry::with_builtins();
    let resolver = FeatureResolver::new(&registry, Environment::empty()).with_store(&store);

    resolver.apply_preset("developer").unwrap();
    resolver.persist(ConfigLayer::Project).unwrap();

    let reopened = open_store(&ws);
    let fresh = FeatureResolver::new(&registry, Environment::empty()).with_store(&reopened);
    assert_eq!(fresh.enabled_features(), resolver.enabled_features());
    assert_eq!(
        fresh.explain("github_cli").unwrap().source,
        EnablementSource::Persisted {
            layer: ConfigLayer::Project
        }
    );
}

#[test]
fn persist_writes_dependencies_enabled_elsewhere() {
    let ws = TestWorkspace::new();
    let store = open_store(&ws);
    let registry = FeatureRegistry::with_builtins();
    let env = Environment::from_pairs([("SWITCHYARD_FEATURES_HOOKS", "true")]);
    let resolver = FeatureResolver::new(&registry, env).with_store(&store);

    resolver.enable("plugins").unwrap();
    assert_eq!(resolver.runtime_state().get("hooks"), None);
    resolver.persist(ConfigLayer::User).unwrap();

    assert_eq!(store.get("features.hooks").unwrap(), ConfigValue::Bool(true));
    let fresh = FeatureResolver::new(&registry, Environment::empty()).with_store(&store);
    assert!(fresh.enabled("plugins"));
    assert!(fresh.enabled("hooks"));
    assert!(fresh.missing_deps("plugins").is_empty());
}

#[test]
fn persist_overrides_lower_layer_even_when_matching_default() {
    let ws = TestWorkspace::new();
    ws.write_user("[features]\nhooks = true\n");
    let store = open_store(&ws);
    let registry = FeatureRegistry::with_builtins();
    let resolver = FeatureResolver::new(&registry, Environment::empty()).with_store(&store);

    resolver.disable("hooks").unwrap();
    resolver.persist(ConfigLayer::Machine).unwrap();

    assert!(ws.read(&ws.machine_file()).contains("hooks = false"));
    let fresh = FeatureResolver::new(&registry, Environment::empty()).with_store(&store);
    let hooks = fresh.explain("hooks").unwrap();
    assert!(!hooks.enabled);
    assert_eq!(
        hooks.source,
        EnablementSource::Persisted {
            layer: ConfigLayer::Machine
        }
    );
}

#[test]
fn persist_clears_entry_when_lower_layers_agree() {
    let ws = TestWorkspace::new();
    ws.write_user("[features]\nhooks = true\n");
    ws.write_machine("[features]\nhooks = false\ntemplates = true\n");
    let store = open_store(&ws);
    let registry = FeatureRegistry::with_builtins();
    let resolver = FeatureResolver::new(&registry, Environment::empty()).with_store(&store);

    resolver.enable("hooks").unwrap();
    resolver.enable("templates").unwrap();
    resolver.persist(ConfigLayer::Machine).unwrap();

    let machine = ws.read(&ws.machine_file());
    assert!(!machine.contains("hooks"));
    assert!(machine.contains("templates = true"));
    let fresh = FeatureResolver::new(&registry, Environment::empty()).with_store(&store);
    assert_eq!(
        fresh.explain("hooks").unwrap().source,
        EnablementSource::Persisted {
            layer: ConfigLayer::User
        }
    );
}

#[test]
fn persisted_lookups_are_served_from_the_store_cache() {
    let ws = TestWorkspace::new();
    ws.write_user("[features]\nhooks = true\n");
    let store = open_store(&ws);
    let registry = FeatureRegistry::with_builtins();
    let resolver = FeatureResolver::new(&registry, Environment::empty()).with_store(&store);
    assert!(resolver.enabled("hooks"));

    ws.write_user("[features]\nhooks = false\n");
    assert!(resolver.enabled("hooks"));

    store.clear_cache();
    assert!(!resolver.enabled("hooks"));
}
