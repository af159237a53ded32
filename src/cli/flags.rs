//! Flag declarations and the per-invocation flag values handed to run
//! functions.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::FlagValue;

/// Names clap reserves on every command.
pub(crate) const RESERVED_FLAGS: [&str; 3] = ["help", "version", "args"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    pub name: String,
    pub short: Option<char>,
    pub default: FlagValue,
    pub help: String,
    /// Visible to every descendant and bound into the global config store.
    pub global: bool,
}

impl FlagSpec {
    /// Flag taking a value.
    pub fn text(name: &str, default: impl Into<String>, help: &str) -> Self {
        Self {
            name: name.to_string(),
            short: None,
            default: FlagValue::Text(default.into()),
            help: help.to_string(),
            global: false,
        }
    }

    /// On/off flag, off unless given.
    pub fn switch(name: &str, help: &str) -> Self {
        Self {
            name: name.to_string(),
            short: None,
            default: FlagValue::Switch(false),
            help: help.to_string(),
            global: false,
        }
    }

    pub fn global(mut self) -> Self {
        self.global = true;
        self
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }
}

/// Values of every flag declared along the dispatched path, explicit or
/// defaulted. Attached to the scope a run function receives.
#[derive(Debug, Clone, Default)]
pub struct ParsedFlags {
    values: BTreeMap<String, FlagValue>,
}

impl ParsedFlags {
    pub(crate) fn insert(&mut self, name: &str, value: FlagValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FlagValue::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FlagValue::as_bool)
    }

    pub fn get_path(&self, name: &str) -> Option<PathBuf> {
        self.get_str(name).map(PathBuf::from)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}
