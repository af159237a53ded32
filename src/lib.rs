//! Powerpipe: command-dispatch bootstrap for the Powerpipe CLI.
//!
//! Builds the command tree, binds global flags to layered configuration,
//! attaches per-invocation capabilities to an execution scope, and turns the
//! dispatched command's outcome into the process exit status.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod scope;
pub mod status;
pub mod version;
