//! Powerpipe command tree.

pub mod mods;
pub mod service;

use clap_complete::Shell;

use crate::cli::{CompletionOptions, FlagSpec, RootCommand};
use crate::config::{default_install_dir, INSTALL_DIR_KEY};
use crate::error::RegistrationError;
use crate::version::{version_line, Version};

pub const PROGRAM_NAME: &str = "powerpipe";
pub const DISPLAY_NAME: &str = "Powerpipe";
const USAGE: &str = "powerpipe [--version] [--help] COMMAND [args]";

/// Root of the program with every subcommand attached.
pub fn root_command() -> Result<RootCommand, RegistrationError> {
    let version = Version::current();
    let template = version_line(DISPLAY_NAME, &version);
    let mut root = RootCommand::new(PROGRAM_NAME, version, DISPLAY_NAME)?
        .with_usage(USAGE)
        .version_template(template)
        .with_completion(CompletionOptions::default().disable_shell(Shell::PowerShell));

    root.declare_flag(
        FlagSpec::text(
            INSTALL_DIR_KEY,
            default_install_dir().to_string_lossy(),
            "Path to the Config Directory",
        )
        .global(),
    )?;

    root.add_child(mods::command()?)?;
    root.add_child(service::command()?)?;
    Ok(root)
}
