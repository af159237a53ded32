//! Well-known filesystem locations.

use std::path::PathBuf;

use directories::BaseDirs;

/// Default installation directory: `~/.powerpipe`, or `.powerpipe` relative
/// to the working directory when no home directory can be determined.
pub fn default_install_dir() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".powerpipe"))
        .unwrap_or_else(|| PathBuf::from(".powerpipe"))
}

/// `$XDG_CONFIG_HOME`, falling back to `~/.config`.
pub fn config_home() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(xdg));
    }
    BaseDirs::new().map(|dirs| dirs.home_dir().join(".config"))
}

/// Path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    config_home().map(|home| home.join("powerpipe").join("config.toml"))
}
