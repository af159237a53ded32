//! Process entry: builds the root scope, dispatches once, and turns the
//! outcome into the process exit status.

use std::ffi::OsString;
use std::thread::{self, JoinHandle};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::exit::ExitController;
use crate::cli::output::Console;
use crate::cli::root::RootCommand;
use crate::scope::{Capabilities, ExecutionScope};
use crate::status::{select_status_capability, StdoutProbe, TerminalProbe};

/// Exit status used when a second interrupt forces the process down.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

pub struct Bootstrap<P: TerminalProbe = StdoutProbe> {
    probe: P,
    handle_interrupts: bool,
}

impl Bootstrap<StdoutProbe> {
    pub fn new() -> Self {
        Self {
            probe: StdoutProbe,
            handle_interrupts: false,
        }
    }
}

impl Default for Bootstrap<StdoutProbe> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: TerminalProbe> Bootstrap<P> {
    /// Decide interactivity with `probe` instead of stdout.
    pub fn with_probe<Q: TerminalProbe>(self, probe: Q) -> Bootstrap<Q> {
        Bootstrap {
            probe,
            handle_interrupts: self.handle_interrupts,
        }
    }

    /// Cancel the root scope on the first Ctrl-C; exit on the second.
    pub fn handle_interrupts(mut self, enabled: bool) -> Self {
        self.handle_interrupts = enabled;
        self
    }

    /// Fresh root scope carrying the status reporter picked by the probe.
    pub fn root_scope(&self) -> ExecutionScope {
        let reporter = select_status_capability(self.probe.is_interactive());
        ExecutionScope::root(Capabilities::new().with(reporter))
    }

    pub fn run<I, T>(&self, root: &RootCommand, argv: I) -> i32
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.run_with(root, argv, &mut Console::stdio())
    }

    /// Dispatch `argv` (program name excluded) once and return the exit
    /// status. The root scope is cancelled before this returns.
    pub fn run_with<I, T>(&self, root: &RootCommand, argv: I, console: &mut Console) -> i32
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let scope = self.root_scope();
        let watcher = if self.handle_interrupts {
            InterruptWatcher::spawn(&scope)
        } else {
            None
        };

        let mut exit = ExitController::new();
        exit.record(root.dispatch_with(argv, &scope, console));

        scope.status().stop();
        scope.cancel();
        if let Some(watcher) = watcher {
            watcher.shutdown();
        }

        let code = exit.finish();
        debug!(code, "Exiting");
        code
    }
}

/// Dispatch `argv` with stdout-driven status selection and no interrupt
/// handling.
pub fn run<I, T>(root: &RootCommand, argv: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    Bootstrap::new().run(root, argv)
}

/// Background thread turning Ctrl-C into scope cancellation.
struct InterruptWatcher {
    done: CancellationToken,
    handle: JoinHandle<()>,
}

impl InterruptWatcher {
    fn spawn(scope: &ExecutionScope) -> Option<Self> {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(error = %e, "Interrupt handling unavailable");
                return None;
            }
        };

        let done = CancellationToken::new();
        let stop = done.clone();
        let token = scope.cancellation_token();
        let handle = thread::spawn(move || {
            runtime.block_on(async move {
                let mut interrupts = 0u32;
                loop {
                    tokio::select! {
                        _ = stop.cancelled() => break,
                        signal = tokio::signal::ctrl_c() => {
                            if let Err(e) = signal {
                                warn!(error = %e, "Failed to listen for interrupts");
                                break;
                            }
                            interrupts += 1;
                            if interrupts == 1 {
                                info!("Interrupt received, cancelling");
                                token.cancel();
                            } else {
                                warn!("Second interrupt, exiting");
                                std::process::exit(INTERRUPTED_EXIT_CODE);
                            }
                        }
                    }
                }
            });
        });
        Some(Self { done, handle })
    }

    fn shutdown(self) {
        self.done.cancel();
        if self.handle.join().is_err() {
            warn!("Interrupt watcher panicked");
        }
    }
}
