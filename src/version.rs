//! Dotted version numbers.
//!
//! Used for the CMake minimum-version check and for minimum-version
//! constraints on discovered packages.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version string: {0:?}")]
pub struct InvalidVersion(pub String);

/// A version made of up to four numeric components (`major.minor.patch.tweak`).
///
/// Missing components compare as zero, so `1.2` == `1.2.0`. A component may carry a
/// non-numeric suffix (as in `1.1.1w`); only its leading digits are significant.
#[derive(Debug, Clone)]
pub struct Version {
    components: Vec<u64>,
}

impl Version {
    pub fn parse(version: &str) -> Result<Self, InvalidVersion> {
        let trimmed = version.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let parts: Vec<&str> = trimmed.split('.').collect();
        if trimmed.is_empty() || parts.len() > 4 {
            return Err(InvalidVersion(version.to_string()));
        }

        let components = parts
            .iter()
            .map(|part| {
                let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
                digits
                    .parse::<u64>()
                    .map_err(|_| InvalidVersion(version.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { components })
    }

    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }

    /// Check a reported version against a minimum.
    ///
    /// Returns `None` when either side cannot be parsed, leaving the decision to
    /// the caller.
    pub fn satisfies_minimum(found: &str, minimum: &str) -> Option<bool> {
        let found = Version::parse(found).ok()?;
        let minimum = Version::parse(minimum).ok()?;
        Some(found >= minimum)
    }
}

impl FromStr for Version {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: Vec<String> = self.components.iter().map(u64::to_string).collect();
        write!(f, "{}", text.join("."))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (0..4)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}
