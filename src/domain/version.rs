use crate::error::{ReleaseError, Result};
use regex::Regex;
use std::fmt;

/// Numeric release version extracted from a tag name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct VersionTriple {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl VersionTriple {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        VersionTriple {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version out of a tag name.
    ///
    /// Every character that is not a digit or `.` is dropped first, so
    /// `v2.3.1`, `release-2.3.1` and `2.3.1-rc` all read as `2.3.1`.
    /// Missing or empty components default to 0 and anything past the
    /// third component is ignored.
    pub fn parse(tag: &str) -> Result<Self> {
        let re = Regex::new(r"[^0-9.]").map_err(|e| ReleaseError::version(e.to_string()))?;
        let cleaned = re.replace_all(tag, "");

        let mut parts = cleaned.split('.');
        let mut next = |label: &str| -> Result<u64> {
            match parts.next() {
                None | Some("") => Ok(0),
                Some(raw) => raw.parse::<u64>().map_err(|_| {
                    ReleaseError::version(format!("Invalid {} component in tag '{}'", label, tag))
                }),
            }
        };

        let major = next("major")?;
        let minor = next("minor")?;
        let patch = next("patch")?;

        Ok(VersionTriple {
            major,
            minor,
            patch,
        })
    }

    /// Apply a bump rule, failing when the bumped component would overflow
    pub fn bump(&self, bump: VersionBump) -> Result<Self> {
        let next = |value: u64, label: &str| {
            value.checked_add(1).ok_or_else(|| {
                ReleaseError::version(format!("Cannot bump {} component of {}", label, self))
            })
        };

        Ok(match bump {
            VersionBump::Major => VersionTriple::new(next(self.major, "major")?, 0, 0),
            VersionBump::Minor => VersionTriple::new(self.major, next(self.minor, "minor")?, 0),
            VersionBump::Patch => {
                VersionTriple::new(self.major, self.minor, next(self.patch, "patch")?)
            }
            VersionBump::None => *self,
        })
    }
}

impl fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Version bump decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
    /// Re-use the current version number
    None,
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionBump::Major => "major",
            VersionBump::Minor => "minor",
            VersionBump::Patch => "patch",
            VersionBump::None => "no bump",
        };
        f.write_str(name)
    }
}
