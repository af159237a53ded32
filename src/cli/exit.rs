//! Exit outcome of one invocation.

use std::fmt;

use tracing::warn;

use crate::error::CommandFailure;

/// Integer status handed back to the hosting process. Zero is success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitOutcome(i32);

impl ExitOutcome {
    pub const SUCCESS: ExitOutcome = ExitOutcome(0);
    pub const FAILURE: ExitOutcome = ExitOutcome(1);

    pub fn new(code: i32) -> Self {
        ExitOutcome(code)
    }

    pub fn code(self) -> i32 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self.0 == 0
    }

    /// Outcome for an error that escaped a run function. Always non-zero.
    pub fn from_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<CommandFailure>() {
            Some(failure) if failure.code != 0 => ExitOutcome(failure.code),
            _ => ExitOutcome::FAILURE,
        }
    }
}

impl Default for ExitOutcome {
    fn default() -> Self {
        ExitOutcome::SUCCESS
    }
}

impl From<i32> for ExitOutcome {
    fn from(code: i32) -> Self {
        ExitOutcome(code)
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Holds the single outcome of an invocation.
///
/// Starts at success, accepts one recorded outcome and is consumed by
/// [`ExitController::finish`], so the value is read exactly once.
#[derive(Debug, Default)]
pub struct ExitController {
    outcome: ExitOutcome,
    recorded: bool,
}

impl ExitController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome. Later calls are ignored.
    pub fn record(&mut self, outcome: ExitOutcome) {
        if self.recorded {
            warn!(
                kept = %self.outcome,
                ignored = %outcome,
                "Exit outcome already recorded"
            );
            return;
        }
        self.outcome = outcome;
        self.recorded = true;
    }

    pub fn is_recorded(&self) -> bool {
        self.recorded
    }

    pub fn finish(self) -> i32 {
        self.outcome.code()
    }
}
