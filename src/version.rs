//! Program version and its display form.

use std::fmt;

/// Semantic version of the running program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Option<String>,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: None,
        }
    }

    /// Parse `MAJOR.MINOR.PATCH[-PRE][+BUILD]`. Build metadata is dropped.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        let core = raw.split('+').next().unwrap_or(raw);
        let (numbers, pre) = match core.split_once('-') {
            Some((numbers, pre)) if !pre.is_empty() => (numbers, Some(pre.to_string())),
            Some(_) => return Err(format!("Empty pre-release in version: {}", raw)),
            None => (core, None),
        };

        let parts: Vec<&str> = numbers.split('.').collect();
        if parts.len() != 3 {
            return Err(format!("Expected MAJOR.MINOR.PATCH, got: {}", raw));
        }
        let number = |part: &str| {
            part.parse::<u64>()
                .map_err(|e| format!("Invalid version component '{}': {}", part, e))
        };

        Ok(Self {
            major: number(parts[0])?,
            minor: number(parts[1])?,
            patch: number(parts[2])?,
            pre,
        })
    }

    /// Version this crate was built as.
    pub fn current() -> Self {
        Self::parse(env!("CARGO_PKG_VERSION")).unwrap_or_else(|_| Self::new(0, 0, 0))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

/// `"<name> v<version>\n"`, the line printed for `--version`.
pub fn version_line(program: &str, version: &Version) -> String {
    format!("{} v{}\n", program, version)
}
