//! Build distribution tags and host defaults.

use serde::{Deserialize, Serialize};
use std::env::consts;
use std::fmt;

/// Default distribution per (OS, architecture).
const HOST_DISTRIBUTIONS: &[(&str, &str, &str)] = &[
    ("linux", "x86_64", "x86_64_v3-unknown-linux-gnu-install_only_stripped"),
    ("linux", "aarch64", "aarch64-unknown-linux-gnu-install_only_stripped"),
    ("linux", "arm", "armv7-unknown-linux-gnueabihf-install_only_stripped"),
    ("macos", "x86_64", "x86_64-apple-darwin-install_only_stripped"),
    ("macos", "aarch64", "aarch64-apple-darwin-install_only_stripped"),
    (
        "windows",
        "x86_64",
        "x86_64-pc-windows-msvc-shared-install_only_stripped",
    ),
    (
        "windows",
        "x86",
        "i686-pc-windows-msvc-shared-install_only_stripped",
    ),
    (
        "windows",
        "aarch64",
        "aarch64-pc-windows-msvc-install_only_stripped",
    ),
];

/// An opaque build-variant tag, e.g. `aarch64-apple-darwin-install_only_stripped`.
///
/// The tag is matched verbatim against the distribution component of
/// upstream asset names; no structure is assumed beyond that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distribution(String);

impl Distribution {
    /// Create a distribution tag from a string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Default distribution for the running host, if the platform is
    /// in the known table.
    pub fn host() -> Option<Self> {
        HOST_DISTRIBUTIONS
            .iter()
            .find(|(os, arch, _)| *os == consts::OS && *arch == consts::ARCH)
            .map(|(_, _, dist)| Self::new(*dist))
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Distribution {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Distribution {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Distribution {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for Distribution {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Distribution {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_table_has_unique_platforms() {
        for (i, (os_a, arch_a, _)) in HOST_DISTRIBUTIONS.iter().enumerate() {
            for (os_b, arch_b, _) in &HOST_DISTRIBUTIONS[i + 1..] {
                assert!(os_a != os_b || arch_a != arch_b);
            }
        }
    }

    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    #[test]
    fn host_default_on_linux_x86_64() {
        assert_eq!(
            Distribution::host().unwrap(),
            "x86_64_v3-unknown-linux-gnu-install_only_stripped"
        );
    }

    #[test]
    fn compares_with_plain_strings() {
        let dist = Distribution::new("aarch64-apple-darwin-install_only_stripped");
        assert_eq!(dist, "aarch64-apple-darwin-install_only_stripped");
        assert_eq!(dist.to_string(), dist.as_str());
    }
}
