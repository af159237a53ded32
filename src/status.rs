//! Status reporting capability.
//!
//! Subcommands report progress through [`StatusReporter`] without knowing
//! whether anything is rendered. The variant is chosen once at startup by
//! [`policy::select_status_capability`] and attached to the root scope.

pub mod policy;
pub mod spinner;

use std::sync::Arc;

pub use policy::{select_status_capability, FixedProbe, StdoutProbe, TerminalProbe};
pub use spinner::Spinner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Interactive,
    Null,
}

#[derive(Clone, Default)]
pub enum StatusReporter {
    /// Renders a live spinner.
    Interactive(Arc<Spinner>),
    #[default]
    Null,
}

impl StatusReporter {
    pub fn interactive() -> Self {
        StatusReporter::Interactive(Arc::new(Spinner::stdout()))
    }

    pub fn kind(&self) -> StatusKind {
        match self {
            StatusReporter::Interactive(_) => StatusKind::Interactive,
            StatusReporter::Null => StatusKind::Null,
        }
    }

    pub fn begin(&self, message: &str) {
        if let StatusReporter::Interactive(spinner) = self {
            spinner.start(message);
        }
    }

    pub fn update(&self, message: &str) {
        if let StatusReporter::Interactive(spinner) = self {
            spinner.set_message(message);
        }
    }

    pub fn stop(&self) {
        if let StatusReporter::Interactive(spinner) = self {
            spinner.stop();
        }
    }
}

impl std::fmt::Debug for StatusReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StatusReporter::{:?}", self.kind())
    }
}
