//! Resolved global configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Value of a flag: free text or an on/off switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    Text(String),
    Switch(bool),
}

impl FlagValue {
    pub fn text(value: impl Into<String>) -> Self {
        FlagValue::Text(value.into())
    }

    pub fn is_switch(&self) -> bool {
        matches!(self, FlagValue::Switch(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlagValue::Text(value) => Some(value),
            FlagValue::Switch(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Switch(value) => Some(*value),
            FlagValue::Text(_) => None,
        }
    }

    /// Parse `raw` into a value of the same kind as `self`.
    pub fn parse_same_kind(&self, raw: &str) -> Result<FlagValue, String> {
        match self {
            FlagValue::Text(_) => Ok(FlagValue::Text(raw.to_string())),
            FlagValue::Switch(_) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(FlagValue::Switch(true)),
                "0" | "false" | "no" | "off" | "" => Ok(FlagValue::Switch(false)),
                _ => Err("expected true or false".to_string()),
            },
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Text(value) => f.write_str(value),
            FlagValue::Switch(value) => write!(f, "{}", value),
        }
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOrigin {
    CommandLine,
    Layer,
    Default,
}

#[derive(Debug, Clone)]
struct Resolved {
    value: FlagValue,
    origin: ValueOrigin,
}

/// Write-once, read-many mapping from global flag name to value.
///
/// Built by [`crate::config::ConfigBinder::resolve`] and never mutated
/// afterwards, so it is shared freely between threads.
#[derive(Debug, Clone, Default)]
pub struct GlobalConfigStore {
    values: BTreeMap<String, Resolved>,
}

impl GlobalConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: &str, value: FlagValue, origin: ValueOrigin) {
        debug_assert!(!self.values.contains_key(key), "key resolved twice: {key}");
        self.values
            .insert(key.to_string(), Resolved { value, origin });
    }

    pub fn get(&self, key: &str) -> Option<&FlagValue> {
        self.values.get(key).map(|resolved| &resolved.value)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FlagValue::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(FlagValue::as_bool)
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get_str(key).map(PathBuf::from)
    }

    pub fn origin(&self, key: &str) -> Option<ValueOrigin> {
        self.values.get(key).map(|resolved| resolved.origin)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
