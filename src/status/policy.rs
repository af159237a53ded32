//! Capability injection policy: pick the status reporter for this process.

use std::io::IsTerminal;

use tracing::debug;

use super::StatusReporter;

/// Answers whether command output goes to an interactive terminal.
pub trait TerminalProbe {
    fn is_interactive(&self) -> bool;
}

/// Probes the process's standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutProbe;

impl TerminalProbe for StdoutProbe {
    fn is_interactive(&self) -> bool {
        std::io::stdout().is_terminal()
    }
}

/// Probe with a predetermined answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe(pub bool);

impl TerminalProbe for FixedProbe {
    fn is_interactive(&self) -> bool {
        self.0
    }
}

/// Interactive spinner for a terminal, no-op reporter otherwise.
pub fn select_status_capability(is_interactive: bool) -> StatusReporter {
    let reporter = if is_interactive {
        StatusReporter::interactive()
    } else {
        StatusReporter::Null
    };
    debug!(kind = ?reporter.kind(), "Selected status reporter");
    reporter
}
