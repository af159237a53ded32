//! Configuration System
//!
//! Global flags are bound into a [`ConfigBinder`] while the command tree is
//! built. At dispatch time each binding resolves to a value with the
//! precedence: explicit command-line flag, then environment variable, then
//! the global config file, then the flag's declared default. The result is an
//! immutable [`GlobalConfigStore`] attached to the execution scope.

mod binder;
mod facade;
mod paths;
mod sources;
mod store;

pub use binder::ConfigBinder;
pub use facade::{ConfigLayers, ConfigLoader, FileConfig};
pub use paths::{config_home, default_install_dir, global_config_path};
pub use store::{FlagValue, GlobalConfigStore, ValueOrigin};

/// Key under which the installation directory is bound.
pub const INSTALL_DIR_KEY: &str = "install-dir";

/// Prefix of environment variables that feed global flags.
pub const ENV_PREFIX: &str = "POWERPIPE";

/// Key used for `name` inside config files and environment layers.
///
/// Both layers are case-insensitive and do not allow dashes in env names, so
/// `install-dir` is looked up as `install_dir`.
pub fn layer_key(name: &str) -> String {
    name.replace('-', "_").to_lowercase()
}
