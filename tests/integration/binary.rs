//! Integration tests that run the built `powerpipe` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

/// Run the binary with HOME and XDG dirs pointed into `home` so no real user
/// configuration leaks in.
fn powerpipe(home: &Path, args: &[&str], envs: &[(&str, &str)]) -> Output {
    let bin = env!("CARGO_BIN_EXE_powerpipe");
    let mut command = Command::new(bin);
    command
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env_remove("POWERPIPE_INSTALL_DIR")
        .env_remove("POWERPIPE_LOG")
        .args(args);
    for (key, value) in envs {
        command.env(key, value);
    }
    command.output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_binary_version() {
    let home = TempDir::new().unwrap();
    let output = powerpipe(home.path(), &["--version"], &[]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        format!("Powerpipe v{}\n", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn test_binary_unknown_command() {
    let home = TempDir::new().unwrap();
    let output = powerpipe(home.path(), &["bogus-command"], &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("unknown command \"bogus-command\" for \"powerpipe\""));
}

#[test]
fn test_binary_no_arguments_prints_usage() {
    let home = TempDir::new().unwrap();
    let output = powerpipe(home.path(), &[], &[]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("powerpipe [--version] [--help] COMMAND [args]"));
}

#[test]
fn test_binary_mod_list_uses_install_dir_flag() {
    let home = TempDir::new().unwrap();
    let install = home.path().join("install");
    fs::create_dir_all(install.join("mods/github.com/turbot/steampipe-mod-aws-insights@v0.21.0"))
        .unwrap();

    let output = powerpipe(
        home.path(),
        &["--install-dir", install.to_str().unwrap(), "mod", "list"],
        &[],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("steampipe-mod-aws-insights"));
}

#[test]
fn test_binary_install_dir_from_environment() {
    let home = TempDir::new().unwrap();
    let install = home.path().join("env-install");
    fs::create_dir_all(&install).unwrap();

    let output = powerpipe(
        home.path(),
        &["service", "status", "--json"],
        &[("POWERPIPE_INSTALL_DIR", install.to_str().unwrap())],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let status: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(status["install_dir"], install.to_str().unwrap());
    assert!(status.get("state").is_none());
}

#[test]
fn test_binary_install_dir_defaults_under_home() {
    let home = TempDir::new().unwrap();
    let output = powerpipe(home.path(), &["service", "status", "--json"], &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let status: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let expected = home.path().join(".powerpipe");
    assert_eq!(status["install_dir"], expected.to_str().unwrap());
}

#[test]
fn test_binary_powershell_completion_disabled() {
    let home = TempDir::new().unwrap();
    let output = powerpipe(home.path(), &["completion", "powershell"], &[]);
    assert!(!output.status.success());

    let output = powerpipe(home.path(), &["completion", "bash"], &[]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("powerpipe"));
}

#[test]
fn test_binary_closed_stdout_is_an_error_not_a_panic() {
    let home = TempDir::new().unwrap();
    let install = home.path().join("install");
    // Enough rows to overflow the pipe buffer once the reader is gone.
    for i in 0..3000 {
        fs::create_dir_all(install.join(format!("mods/github.com/turbot/mod-{i:04}@v1.0.0"))).unwrap();
    }

    let mut child = Command::new(env!("CARGO_BIN_EXE_powerpipe"))
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("POWERPIPE_INSTALL_DIR")
        .env_remove("POWERPIPE_LOG")
        .args(["--install-dir", install.to_str().unwrap(), "mod", "list"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    drop(child.stdout.take());
    let output = child.wait_with_output().unwrap();

    assert_eq!(output.status.code(), Some(1), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("writing mod list"));
    assert!(!stderr(&output).contains("panicked"));
}
