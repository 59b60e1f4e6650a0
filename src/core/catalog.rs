//! Release catalogs mapping versions to distribution download URLs.

use crate::core::matcher::VersionMatcher;
use crate::types::{Distribution, ReleaseId, Version};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Archive suffixes upstream publishes for interpreter builds.
const ARCHIVE_SUFFIXES: &[&str] = &[".tar.zst", ".tar.gz"];

/// One release's download URLs, keyed by version and distribution.
///
/// The serialized form is the nested map itself; this is the on-disk
/// shape of the per-release cache file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseCatalog {
    versions: BTreeMap<Version, BTreeMap<Distribution, String>>,
}

impl ReleaseCatalog {
    /// Build a catalog from release asset (name, URL) pairs.
    ///
    /// Assets that are not cpython tarballs are ignored, as are assets
    /// whose embedded `+filetag` does not match `tag`.
    pub fn from_assets<'a, I>(assets: I, tag: &ReleaseId) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut versions: BTreeMap<Version, BTreeMap<Distribution, String>> = BTreeMap::new();
        for (name, url) in assets {
            let Some((implementation, version, distribution)) = parse_asset(name, tag) else {
                continue;
            };
            if implementation != "cpython" {
                continue;
            }
            versions
                .entry(version)
                .or_default()
                .insert(distribution, url.to_string());
        }
        Self { versions }
    }

    /// True when the release offers nothing compatible.
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Offered versions in ascending order.
    pub fn versions(&self) -> impl Iterator<Item = &Version> {
        self.versions.keys()
    }

    /// Distributions offered for one version.
    pub fn distributions(&self, version: &Version) -> Option<&BTreeMap<Distribution, String>> {
        self.versions.get(version)
    }

    /// Download URL for a (version, distribution) pair.
    pub fn url(&self, version: &Version, distribution: &Distribution) -> Option<&str> {
        self.versions
            .get(version)
            .and_then(|dists| dists.get(distribution))
            .map(String::as_str)
    }

    /// Matcher over the offered versions.
    pub fn matcher(&self) -> VersionMatcher {
        VersionMatcher::new(self.versions.keys().cloned())
    }
}

/// Split an asset name into (implementation, version, distribution).
///
/// Names look like
/// `cpython-3.12.3+20240415-x86_64-unknown-linux-gnu-install_only_stripped.tar.gz`;
/// anything else is skipped.
fn parse_asset<'a>(name: &'a str, tag: &ReleaseId) -> Option<(&'a str, Version, Distribution)> {
    let stem = ARCHIVE_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))?;
    let (implementation, rest) = stem.split_once('-')?;
    let (version, distribution) = rest.split_once('-')?;
    let version = match version.split_once('+') {
        Some((version, filetag)) => {
            if filetag != tag.as_str() {
                return None;
            }
            version
        }
        None => version,
    };
    Some((
        implementation,
        Version::new(version),
        Distribution::new(distribution),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAG: &str = "20240415";

    fn tag() -> ReleaseId {
        ReleaseId::parse(TAG).unwrap()
    }

    #[test]
    fn collects_cpython_tarballs() {
        let catalog = ReleaseCatalog::from_assets(
            [
                (
                    "cpython-3.12.3+20240415-x86_64-unknown-linux-gnu-install_only.tar.gz",
                    "https://example.com/a.tar.gz",
                ),
                (
                    "cpython-3.12.3+20240415-aarch64-apple-darwin-install_only_stripped.tar.gz",
                    "https://example.com/b.tar.gz",
                ),
                (
                    "cpython-3.13.0b1+20240415-x86_64-unknown-linux-gnu-freethreaded+pgo-full.tar.zst",
                    "https://example.com/c.tar.zst",
                ),
            ],
            &tag(),
        );
        let versions: Vec<&str> = catalog.versions().map(Version::as_str).collect();
        assert_eq!(versions, ["3.12.3", "3.13.0b1"]);
        assert_eq!(
            catalog.url(
                &Version::new("3.12.3"),
                &Distribution::new("aarch64-apple-darwin-install_only_stripped"),
            ),
            Some("https://example.com/b.tar.gz")
        );
        assert_eq!(
            catalog
                .distributions(&Version::new("3.12.3"))
                .map(BTreeMap::len),
            Some(2)
        );
    }

    #[test]
    fn skips_foreign_assets() {
        let catalog = ReleaseCatalog::from_assets(
            [
                ("SHA256SUMS", "https://example.com/sums"),
                (
                    "cpython-3.12.3+20240415-x86_64-unknown-linux-gnu-install_only.tar.gz.sha256",
                    "https://example.com/a.sha256",
                ),
                (
                    "pypy-7.3.15+20240415-x86_64-unknown-linux-gnu-install_only.tar.gz",
                    "https://example.com/pypy.tar.gz",
                ),
            ],
            &tag(),
        );
        assert!(catalog.is_empty());
    }

    #[test]
    fn skips_mismatched_filetags() {
        let catalog = ReleaseCatalog::from_assets(
            [(
                "cpython-3.12.3+20240414-x86_64-unknown-linux-gnu-install_only.tar.gz",
                "https://example.com/old.tar.gz",
            )],
            &tag(),
        );
        assert!(catalog.is_empty());
    }

    #[test]
    fn cache_file_round_trip() {
        let catalog = ReleaseCatalog::from_assets(
            [(
                "cpython-3.12.3+20240415-x86_64-unknown-linux-gnu-install_only.tar.gz",
                "https://example.com/a.tar.gz",
            )],
            &tag(),
        );
        let json = serde_json::to_string(&catalog).unwrap();
        let back: ReleaseCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, catalog);

        let empty: ReleaseCatalog = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn matcher_sees_offered_versions() {
        let catalog = ReleaseCatalog::from_assets(
            [
                (
                    "cpython-3.12.1+20240415-x86_64-unknown-linux-gnu-install_only.tar.gz",
                    "https://example.com/a.tar.gz",
                ),
                (
                    "cpython-3.12.3+20240415-x86_64-unknown-linux-gnu-install_only.tar.gz",
                    "https://example.com/b.tar.gz",
                ),
            ],
            &tag(),
        );
        let matcher = catalog.matcher();
        assert_eq!(
            matcher.resolve(Some("3.12"), false).unwrap().as_str(),
            "3.12.3"
        );
    }
}
