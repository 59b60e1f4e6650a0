//! Version specifier matching against a release's offerings.

use crate::types::Version;
use crate::types::version::is_formal_release;

/// Resolves version specifiers against the versions one release
/// offers. Candidates are held newest-first.
#[derive(Debug, Clone)]
pub struct VersionMatcher {
    versions: Vec<Version>,
}

impl VersionMatcher {
    /// Build a matcher over a set of offered versions.
    pub fn new(versions: impl IntoIterator<Item = Version>) -> Self {
        let mut versions: Vec<Version> = versions.into_iter().collect();
        versions.sort_by(|a, b| b.cmp(a));
        Self { versions }
    }

    /// The newest formal version on offer.
    pub fn latest_formal(&self) -> Option<&Version> {
        self.versions.iter().find(|v| v.is_formal())
    }

    /// Resolve `specifier` to an offered version.
    ///
    /// Without a specifier this is the newest formal version. An exact
    /// offering is returned as-is unless `upgrade` is set. Otherwise
    /// the specifier is treated as a dot-terminated prefix, with
    /// upgrade mode dropping the last component first, and the newest
    /// offering under that prefix wins. A dot-free specifier always
    /// behaves as an upgrade. In upgrade mode a formal specifier only
    /// ever matches formal versions; a pre-release specifier may
    /// resolve to a newer pre-release or a formal version.
    pub fn resolve(&self, specifier: Option<&str>, upgrade: bool) -> Option<&Version> {
        let Some(spec) = specifier else {
            return self.latest_formal();
        };
        if !upgrade {
            if let Some(v) = self.versions.iter().find(|v| v.as_str() == spec) {
                return Some(v);
            }
        }
        let formal_spec = is_formal_release(spec);
        let upgrade = upgrade || !spec.contains('.');
        let mut prefix = match spec.rsplit_once('.') {
            Some((head, _)) if upgrade => head.to_string(),
            _ => spec.to_string(),
        };
        if !prefix.ends_with('.') {
            prefix.push('.');
        }
        self.versions
            .iter()
            .find(|v| v.as_str().starts_with(&prefix) && (!upgrade || !formal_spec || v.is_formal()))
    }
}
