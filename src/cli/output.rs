//! CLI output: where dispatch writes help, version, and errors, and how
//! dispatch errors are phrased for the user.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::DispatchError;

pub struct Console {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
}

impl Console {
    pub fn new(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self { out, err }
    }

    /// Process stdout and stderr.
    pub fn stdio() -> Self {
        Self::new(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// In-memory console; returns the buffers behind stdout and stderr.
    pub fn buffered() -> (Self, SharedBuffer, SharedBuffer) {
        let out = SharedBuffer::new();
        let err = SharedBuffer::new();
        let console = Self::new(Box::new(out.clone()), Box::new(err.clone()));
        (console, out, err)
    }

    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    pub fn err(&mut self) -> &mut dyn Write {
        &mut *self.err
    }

    /// Write `text` to stdout. Broken pipes are not the command's failure.
    pub fn print(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }

    pub fn eprint(&mut self, text: &str) {
        let _ = self.err.write_all(text.as_bytes());
        let _ = self.err.flush();
    }
}

/// Cloneable in-memory writer.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Map a dispatch error to the text printed on stderr.
pub fn map_error(e: &DispatchError, program: &str) -> String {
    match e {
        DispatchError::UnknownCommand { path, .. } => format!(
            "Error: {}\nRun '{} --help' for usage.\n",
            e, path
        ),
        DispatchError::MalformedFlag(message) => format!("Error: {}\n", message.trim_end()),
        DispatchError::InvalidConfigValue { .. } => format!(
            "Error: {}\nRun '{} --help' for usage.\n",
            e, program
        ),
        DispatchError::Command(inner) => format!("Error: {:#}\n", inner),
    }
}
