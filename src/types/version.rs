//! Python version strings and their ordering.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::path::Path;

/// Returns true when `s` names a formal release: removing every dot
/// must leave a non-empty, all-digit string.
///
/// ```
/// use pyvm::types::version::is_formal_release;
///
/// assert!(is_formal_release("3.12.3"));
/// assert!(!is_formal_release("3.13.0b1"));
/// assert!(!is_formal_release(""));
/// ```
pub fn is_formal_release(s: &str) -> bool {
    let mut seen_digit = false;
    for c in s.chars() {
        if c == '.' {
            continue;
        }
        if !c.is_ascii_digit() {
            return false;
        }
        seen_digit = true;
    }
    seen_digit
}

/// A Python version string, e.g. `3.12.3` or `3.13.0rc2`.
///
/// Ordering compares numeric components numerically, with pre-release
/// suffixes sorting below the formal release they precede:
///
/// ```
/// use pyvm::types::Version;
///
/// assert!(Version::new("3.9.18") < Version::new("3.10.0"));
/// assert!(Version::new("3.13.0rc2") < Version::new("3.13.0"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    /// Create a version from a string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the version as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for formal releases, false for pre-releases.
    pub fn is_formal(&self) -> bool {
        is_formal_release(&self.0)
    }

    fn sort_key(&self) -> VersionKey {
        VersionKey::parse(&self.0)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for Version {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<Path> for Version {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Version {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for Version {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Version {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Parsed comparison form of a version string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct VersionKey {
    release: Vec<u64>,
    pre: PreRelease,
}

/// Pre-release stages in ascending order; `Final` sorts above all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum PreRelease {
    Alpha(u64),
    Beta(u64),
    Candidate(u64),
    Final,
}

impl VersionKey {
    fn parse(s: &str) -> Self {
        let mut release = Vec::new();
        let mut pre = PreRelease::Final;
        for part in s.split('.') {
            let split = part
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(part.len());
            let (digits, rest) = part.split_at(split);
            release.push(digits.parse().unwrap_or(0));
            if !rest.is_empty() {
                // The suffix fuses with the last numeric component,
                // as in `3.13.0b1`.
                pre = PreRelease::parse(rest);
                break;
            }
        }
        Self { release, pre }
    }
}

impl PreRelease {
    fn parse(s: &str) -> Self {
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(s.len());
        let (tag, digits) = s.split_at(split);
        let n = digits.parse().unwrap_or(0);
        match tag {
            "b" | "beta" => Self::Beta(n),
            "c" | "rc" => Self::Candidate(n),
            _ => Self::Alpha(n),
        }
    }
}
