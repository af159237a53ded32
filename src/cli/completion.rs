//! Built-in `completion <shell>` command.

use clap::Command;
use clap_complete::{generate, Shell};
use tracing::debug;

use crate::error::DispatchError;

/// Write the completion script for `shell_name` to `out`.
pub fn write_completion(
    command: &mut Command,
    bin_name: &str,
    shell_name: &str,
    out: &mut dyn std::io::Write,
) -> Result<(), DispatchError> {
    let shell: Shell = shell_name
        .parse()
        .map_err(|e: String| DispatchError::MalformedFlag(e))?;
    debug!(shell = %shell, "Generating completion script");
    generate(shell, command, bin_name.to_string(), out);
    Ok(())
}
