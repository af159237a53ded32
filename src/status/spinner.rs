//! Terminal spinner used by the interactive status reporter.

use std::io::Write;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use owo_colors::OwoColorize;
use parking_lot::Mutex;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const CLEAR_LINE: &str = "\r\x1b[2K";
const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

#[derive(Default)]
struct SpinnerState {
    message: String,
    running: bool,
}

pub struct Spinner {
    state: Arc<Mutex<SpinnerState>>,
    writer: SharedWriter,
    ticker: Mutex<Option<JoinHandle<()>>>,
    interval: Duration,
}

impl Spinner {
    pub fn stdout() -> Self {
        Self::with_writer(Box::new(std::io::stdout()), DEFAULT_INTERVAL)
    }

    pub fn with_writer(writer: Box<dyn Write + Send>, interval: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(SpinnerState::default())),
            writer: Arc::new(Mutex::new(writer)),
            ticker: Mutex::new(None),
            interval,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// Show the spinner with `message`. Restarting a running spinner only
    /// replaces the message.
    pub fn start(&self, message: &str) {
        // Held until the handle is stored so a concurrent `stop` always joins it.
        let mut ticker = self.ticker.lock();
        {
            let mut state = self.state.lock();
            state.message = message.to_string();
            if state.running {
                return;
            }
            state.running = true;
        }

        let state = Arc::clone(&self.state);
        let writer = Arc::clone(&self.writer);
        let interval = self.interval;
        let handle = thread::spawn(move || {
            let mut frame = 0usize;
            loop {
                let message = {
                    let state = state.lock();
                    if !state.running {
                        break;
                    }
                    state.message.clone()
                };
                {
                    let mut out = writer.lock();
                    // Rendering failures only lose a frame.
                    let _ = write!(
                        out,
                        "{}{} {}",
                        CLEAR_LINE,
                        FRAMES[frame % FRAMES.len()].cyan(),
                        message
                    );
                    let _ = out.flush();
                }
                frame = frame.wrapping_add(1);
                thread::sleep(interval);
            }
        });
        *ticker = Some(handle);
    }

    /// Replace the message, starting the spinner if it is not shown yet.
    pub fn set_message(&self, message: &str) {
        let running = {
            let mut state = self.state.lock();
            state.message = message.to_string();
            state.running
        };
        if !running {
            self.start(message);
        }
    }

    /// Hide the spinner and clear its line. Idempotent.
    pub fn stop(&self) {
        let mut ticker = self.ticker.lock();
        let was_running = {
            let mut state = self.state.lock();
            std::mem::replace(&mut state.running, false)
        };
        if let Some(handle) = ticker.take() {
            let _ = handle.join();
        }
        if was_running {
            let mut out = self.writer.lock();
            let _ = write!(out, "{}", CLEAR_LINE);
            let _ = out.flush();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}
