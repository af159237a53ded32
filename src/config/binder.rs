//! Global flag bindings collected while the command tree is built.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::facade::ConfigLayers;
use super::store::{FlagValue, GlobalConfigStore, ValueOrigin};
use crate::error::{DispatchError, RegistrationError};

#[derive(Debug, Clone, Default)]
pub struct ConfigBinder {
    bindings: BTreeMap<String, FlagValue>,
}

impl ConfigBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` with its declared default. Each name binds at most once.
    pub fn bind(&mut self, name: &str, default: FlagValue) -> Result<(), RegistrationError> {
        if self.bindings.contains_key(name) {
            return Err(RegistrationError::DuplicateBinding(name.to_string()));
        }
        debug!(key = name, default = %default, "Bound global flag");
        self.bindings.insert(name.to_string(), default);
        Ok(())
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Bound names with their declared defaults.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &FlagValue)> {
        self.bindings.iter().map(|(name, default)| (name.as_str(), default))
    }

    /// Resolve every binding for one invocation.
    ///
    /// `command_line` holds only the flags the user passed explicitly.
    pub fn resolve(
        &self,
        command_line: &HashMap<String, FlagValue>,
        layers: &ConfigLayers,
    ) -> Result<GlobalConfigStore, DispatchError> {
        let mut store = GlobalConfigStore::new();
        for (name, default) in &self.bindings {
            if let Some(value) = command_line.get(name) {
                store.insert(name, value.clone(), ValueOrigin::CommandLine);
                continue;
            }
            match layers.get_string(name)? {
                Some(raw) => {
                    let value = default.parse_same_kind(&raw).map_err(|reason| {
                        DispatchError::InvalidConfigValue {
                            key: name.clone(),
                            value: raw.clone(),
                            reason,
                        }
                    })?;
                    store.insert(name, value, ValueOrigin::Layer);
                }
                None => store.insert(name, default.clone(), ValueOrigin::Default),
            }
        }
        Ok(store)
    }
}
