//! Config facade: loads the layered sources that back global flags.

use config::Config;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::layer_key;
use super::sources;
use crate::error::{ConfigError, DispatchError};
use crate::logging::LoggingConfig;

/// Settings read from the config file that are not bound to flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Environment and file layers consulted for global flags that were not
/// given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigLayers {
    config: Option<Config>,
}

impl ConfigLayers {
    /// No layers: every unset flag resolves to its declared default.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_config(config: Config) -> Self {
        Self {
            config: Some(config),
        }
    }

    /// Raw layered value for the flag `name`, if any layer sets it.
    ///
    /// A value that is set but is not a scalar (a table or an array) is an
    /// `InvalidConfigValue` error rather than an absent value.
    pub fn get_string(&self, name: &str) -> Result<Option<String>, DispatchError> {
        let Some(config) = &self.config else {
            return Ok(None);
        };
        let key = layer_key(name);
        match config.get_string(&key) {
            Ok(value) => Ok(Some(value)),
            Err(config::ConfigError::NotFound(_)) => Ok(None),
            Err(e) => Err(DispatchError::InvalidConfigValue {
                key: name.to_string(),
                value: config
                    .get::<config::Value>(&key)
                    .map(|value| value.to_string())
                    .unwrap_or_default(),
                reason: e.to_string(),
            }),
        }
    }

    /// File-only settings (logging and friends).
    pub fn file_config(&self) -> Result<FileConfig, ConfigError> {
        match &self.config {
            Some(config) => Ok(config.clone().try_deserialize()?),
            None => Ok(FileConfig::default()),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Global config file (when present) overlaid by `POWERPIPE_*` variables.
    pub fn load() -> Result<ConfigLayers, ConfigError> {
        let builder = sources::global_file::add_to_builder(Config::builder())?;
        let builder = sources::environment::add_to_builder(builder, None);
        let config = builder.build()?;
        debug!("Loaded global configuration layers");
        Ok(ConfigLayers::from_config(config))
    }
}
