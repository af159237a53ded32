//! `powerpipe service`: inspect the local Powerpipe service.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::{CommandNode, ExitOutcome, FlagSpec, INTERRUPTED_EXIT_CODE};
use crate::config::INSTALL_DIR_KEY;
use crate::error::{CommandFailure, RegistrationError};
use crate::scope::ExecutionScope;

/// State file written by a running service, relative to the install dir.
const STATE_FILE: &str = "internal/service.json";

/// Contents of the service state file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceState {
    pub pid: u32,
    pub port: u16,
    #[serde(default)]
    pub listen: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub install_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ServiceState>,
}

impl ServiceStatus {
    pub fn is_running(&self) -> bool {
        self.state.is_some()
    }
}

pub fn command() -> Result<CommandNode, RegistrationError> {
    let mut service = CommandNode::new("service", "Powerpipe service management")?;
    let mut status = CommandNode::new("status", "Status of the Powerpipe service")?.with_run(run_status);
    status.declare_flag(FlagSpec::switch("json", "Output as JSON"))?;
    service.add_child(status)?;
    Ok(service)
}

/// Read the service state under `install_dir`. A missing state file means
/// the service is not running.
pub fn read_status(install_dir: &Path) -> anyhow::Result<ServiceStatus> {
    let path = install_dir.join(STATE_FILE);
    let state = if path.exists() {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let state: ServiceState = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;
        Some(state)
    } else {
        None
    };
    Ok(ServiceStatus {
        install_dir: install_dir.to_path_buf(),
        state,
    })
}

pub fn format_status_text(status: &ServiceStatus) -> String {
    let mut out = format!("Install dir: {}\n", status.install_dir.display());
    match &status.state {
        Some(state) => {
            out.push_str(&format!("Service:     {}\n", "running".green()));
            out.push_str(&format!("PID:         {}\n", state.pid));
            out.push_str(&format!("Port:        {}\n", state.port));
            if !state.listen.is_empty() {
                out.push_str(&format!("Listening:   {}\n", state.listen.join(", ")));
            }
        }
        None => out.push_str(&format!("Service:     {}\n", "not running".yellow())),
    }
    out
}

/// Write `status` to `out` as text or pretty JSON.
pub fn write_status(out: &mut dyn Write, status: &ServiceStatus, json: bool) -> anyhow::Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(status)?)?;
    } else {
        out.write_all(format_status_text(status).as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

fn run_status(scope: &ExecutionScope, _args: &[String]) -> anyhow::Result<ExitOutcome> {
    let install_dir = scope
        .config()
        .and_then(|store| store.get_path(INSTALL_DIR_KEY))
        .context("install directory is not configured")?;
    let json = scope
        .flags()
        .and_then(|flags| flags.get_bool("json"))
        .unwrap_or(false);

    let reporter = scope.status();
    reporter.begin("Checking service status");
    let status = read_status(&install_dir);
    reporter.stop();

    if scope.is_cancelled() {
        return Err(CommandFailure::new(INTERRUPTED_EXIT_CODE, "interrupted").into());
    }
    let status = status?;
    debug!(running = status.is_running(), "Service status read");

    write_status(&mut std::io::stdout().lock(), &status, json)
        .context("writing service status")?;
    Ok(ExitOutcome::SUCCESS)
}
