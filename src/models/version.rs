//! Three-component artifact version tags.
//!
//! Versions are stored as dotted decimal strings. Parsing is strict:
//! genuinely absent components take documented defaults, but a
//! non-numeric component is rejected rather than silently zeroed, so a
//! corrupted stored version surfaces as an error instead of restarting
//! the artifact's history.

use std::fmt;

use thiserror::Error;

/// Version rendered to clients for artifacts that have never been
/// through the token-gated update flow.
pub const DISPLAY_DEFAULT: &str = "0.3.5";

/// A `major.minor.patch` version tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// A version component was present but not a decimal number.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("malformed version component {component:?} in {input:?}")]
pub struct VersionParseError {
    pub input: String,
    pub component: String,
}

impl Version {
    /// Baseline assumed by the update flow when no version was ever
    /// recorded for an artifact.
    pub const BASELINE: Version = Version {
        major: 1,
        minor: 0,
        patch: 0,
    };

    /// Parse a dotted version string.
    ///
    /// Genuinely absent components default (`major` = 1,
    /// `minor`/`patch` = 0) and an empty input is the `1.0.0`
    /// baseline. A component that is present but empty (`"1..3"`),
    /// malformed, or beyond the third fails closed.
    pub fn parse(input: &str) -> Result<Version, VersionParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Version::BASELINE);
        }

        let malformed = |component: &str| VersionParseError {
            input: trimmed.to_string(),
            component: component.to_string(),
        };

        let mut parts = trimmed.split('.');
        let major = parse_component(parts.next(), 1).map_err(&malformed)?;
        let minor = parse_component(parts.next(), 0).map_err(&malformed)?;
        let patch = parse_component(parts.next(), 0).map_err(&malformed)?;
        if let Some(extra) = parts.next() {
            return Err(malformed(extra));
        }

        Ok(Version {
            major,
            minor,
            patch,
        })
    }

    /// The next version after a successful payload replacement.
    pub fn bump_patch(self) -> Version {
        Version {
            patch: self.patch + 1,
            ..self
        }
    }
}

fn parse_component<'a>(part: Option<&'a str>, default: u32) -> Result<u32, &'a str> {
    match part {
        None => Ok(default),
        Some(p) => p.trim().parse::<u32>().map_err(|_| p),
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
