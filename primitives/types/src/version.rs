//! Node version representation.
//!
//! The daemon reports versions such as `2.4.3`, `2.4.4rc1` or
//! `2.1.2.dev123`. Clients use the numeric part to gate commands that only
//! exist on newer nodes.
use std::cmp::Ordering;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A parsed node version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeVersion {
    /// Original version string as reported by the daemon.
    pub version_string: String,
    /// Major version component (e.g., `2` in `2.4.3`).
    pub major: u32,
    /// Minor version component (e.g., `4` in `2.4.3`).
    pub minor: u32,
    /// Patch component (e.g., `3` in `2.4.3`).
    pub patch: u32,
    /// Pre-release or development suffix (e.g., `rc1`, `.dev123`), empty for releases.
    pub suffix: String,
}

impl PartialOrd for NodeVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for NodeVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        // a release sorts after its own pre-releases
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (self.suffix.is_empty(), other.suffix.is_empty()) {
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                _ => self.suffix.cmp(&other.suffix),
            })
    }
}

/// Errors that can occur while parsing versions.
#[derive(Error, Debug)]
pub enum VersionError {
    /// The provided string did not match the expected version format.
    #[error("Invalid version format: {0}")]
    InvalidFormat(String),
    /// A numeric parse or regex error occurred.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl NodeVersion {
    /// Parse a version in the `[v]MAJOR.MINOR[.PATCH][suffix]` format.
    pub fn from_string(s: &str) -> Result<Self, VersionError> {
        let re = Regex::new(r"^[vV]?(\d+)\.(\d+)(?:\.(\d+))?(.*)$")
            .map_err(|e: regex::Error| VersionError::Parse(e.to_string()))?;
        let trimmed = s.trim();
        let caps =
            re.captures(trimmed).ok_or_else(|| VersionError::InvalidFormat(s.to_string()))?;

        let number = |text: &str| {
            text.parse::<u32>().map_err(|e: std::num::ParseIntError| VersionError::Parse(e.to_string()))
        };

        Ok(Self {
            version_string: trimmed.to_string(),
            major: number(&caps[1])?,
            minor: number(&caps[2])?,
            patch: match caps.get(3) {
                Some(m) => number(m.as_str())?,
                None => 0,
            },
            suffix: caps.get(4).map(|m| m.as_str().to_string()).unwrap_or_default(),
        })
    }

    /// Return the original version string.
    pub fn as_str(&self) -> &str { &self.version_string }

    /// `true` for tagged releases (no pre-release or dev suffix).
    pub fn is_release(&self) -> bool { self.suffix.is_empty() }

    /// `true` if the numeric part is at least `major.minor.patch`.
    pub fn at_least(&self, major: u32, minor: u32, patch: u32) -> bool {
        (self.major, self.minor, self.patch) >= (major, minor, patch)
    }
}

impl std::fmt::Display for NodeVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.version_string)
    }
}

impl std::str::FromStr for NodeVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::from_string(s) }
}
