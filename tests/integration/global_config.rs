//! Integration tests for global flag binding and layered configuration

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use config::{Config, Environment, File};
use parking_lot::Mutex;
use powerpipe::cli::{CommandNode, ExitOutcome, FlagSpec, RootCommand};
use powerpipe::config::{ConfigLayers, FlagValue, ValueOrigin};
use powerpipe::version::Version;
use tempfile::TempDir;

use super::test_utils::{run_captured, sample_tree, sample_tree_with_layers, Journal};

fn env_layers(vars: &[(&str, &str)]) -> ConfigLayers {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let config = Config::builder()
        .add_source(Environment::with_prefix("POWERPIPE").source(Some(vars)))
        .build()
        .unwrap();
    ConfigLayers::from_config(config)
}

fn last_install_dir(journal: &Journal) -> Option<String> {
    journal.lock().last().and_then(|call| call.install_dir.clone())
}

#[test]
fn test_install_dir_flag_reaches_service() {
    let journal = Journal::default();
    let root = sample_tree(&journal);

    let result = run_captured(&root, &["--install-dir", "/custom/path", "service", "start"]);
    assert_eq!(result.code, 0, "stderr: {}", result.stderr);
    assert_eq!(last_install_dir(&journal).as_deref(), Some("/custom/path"));
}

#[test]
fn test_global_flag_accepted_after_subcommand() {
    let journal = Journal::default();
    let root = sample_tree(&journal);

    run_captured(&root, &["service", "start", "--install-dir=/late/path"]);
    assert_eq!(last_install_dir(&journal).as_deref(), Some("/late/path"));
}

#[test]
fn test_install_dir_defaults_when_unset() {
    let journal = Journal::default();
    let root = sample_tree(&journal);

    run_captured(&root, &["service", "start"]);
    assert_eq!(last_install_dir(&journal).as_deref(), Some("/default/install"));
}

#[test]
fn test_environment_layer_beats_default() {
    let journal = Journal::default();
    let root = sample_tree_with_layers(
        &journal,
        env_layers(&[("POWERPIPE_INSTALL_DIR", "/from/env")]),
    );

    run_captured(&root, &["service", "start"]);
    assert_eq!(last_install_dir(&journal).as_deref(), Some("/from/env"));
}

#[test]
fn test_command_line_beats_environment() {
    let journal = Journal::default();
    let root = sample_tree_with_layers(
        &journal,
        env_layers(&[("POWERPIPE_INSTALL_DIR", "/from/env")]),
    );

    run_captured(&root, &["--install-dir", "/from/cli", "service", "start"]);
    assert_eq!(last_install_dir(&journal).as_deref(), Some("/from/cli"));
}

#[test]
fn test_config_file_layer() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "install_dir = \"/from/file\"\n").unwrap();
    let config = Config::builder()
        .add_source(File::from(path.as_path()))
        .build()
        .unwrap();

    let journal = Journal::default();
    let root = sample_tree_with_layers(&journal, ConfigLayers::from_config(config));
    run_captured(&root, &["service", "stop"]);
    assert_eq!(last_install_dir(&journal).as_deref(), Some("/from/file"));
}

fn switch_root(seen: &Arc<Mutex<Option<(FlagValue, ValueOrigin)>>>, layers: ConfigLayers) -> RootCommand {
    let sink = Arc::clone(seen);
    let mut root = RootCommand::new("powerpipe", Version::new(0, 1, 0), "Powerpipe")
        .unwrap()
        .with_layers(layers);
    root.declare_flag(FlagSpec::switch("telemetry-off", "Disable telemetry").global())
        .unwrap();
    root.add_child(CommandNode::new("service", "").unwrap().with_run(move |scope, _| {
        let store = scope.config().unwrap();
        *sink.lock() = Some((
            store.get("telemetry-off").unwrap().clone(),
            store.origin("telemetry-off").unwrap(),
        ));
        Ok(ExitOutcome::SUCCESS)
    }))
    .unwrap();
    root
}

#[test]
fn test_switch_layers_parse_and_report_origin() {
    let seen = Arc::default();

    let root = switch_root(&seen, ConfigLayers::empty());
    run_captured(&root, &["service"]);
    assert_eq!(
        seen.lock().clone(),
        Some((FlagValue::Switch(false), ValueOrigin::Default))
    );

    run_captured(&root, &["--telemetry-off", "service"]);
    assert_eq!(
        seen.lock().clone(),
        Some((FlagValue::Switch(true), ValueOrigin::CommandLine))
    );

    let root = switch_root(&seen, env_layers(&[("POWERPIPE_TELEMETRY_OFF", "yes")]));
    run_captured(&root, &["service"]);
    assert_eq!(
        seen.lock().clone(),
        Some((FlagValue::Switch(true), ValueOrigin::Layer))
    );
}

#[test]
fn test_invalid_layered_switch_fails_dispatch() {
    let seen = Arc::default();
    let root = switch_root(&seen, env_layers(&[("POWERPIPE_TELEMETRY_OFF", "maybe")]));

    let result = run_captured(&root, &["service"]);
    assert_ne!(result.code, 0);
    assert!(result.stderr.contains("telemetry-off"), "stderr: {}", result.stderr);
    assert!(seen.lock().is_none());
}

#[test]
fn test_non_scalar_config_value_fails_dispatch() {
    let config = Config::builder()
        .add_source(File::from_str("install_dir = [\"a\"]\n", config::FileFormat::Toml))
        .build()
        .unwrap();

    let journal = Journal::default();
    let root = sample_tree_with_layers(&journal, ConfigLayers::from_config(config));
    let result = run_captured(&root, &["service", "start"]);
    assert_ne!(result.code, 0);
    assert!(result.stderr.contains("install-dir"), "stderr: {}", result.stderr);
    assert!(journal.lock().is_empty());
}
