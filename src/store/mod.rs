//! On-disk records for installed versions.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{Distribution, ReleaseId, Version};

/// Name of the record file written into each installed version directory.
pub const RECORD_FILE: &str = "pyvm.json";

/// What was installed into a version directory, and from where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallRecord {
    pub release: ReleaseId,
    pub distribution: Distribution,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stripped: bool,
}

impl InstallRecord {
    /// Read the record out of a version directory.
    ///
    /// A directory without a readable record still holds files, but the
    /// release bookkeeping treats it as not installed.
    pub fn load(version_dir: &Path) -> Option<Self> {
        let data = fs::read_to_string(version_dir.join(RECORD_FILE)).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// Write the record into a version directory.
    pub fn save(&self, version_dir: &Path) -> io::Result<()> {
        let data = serde_json::to_vec_pretty(self).map_err(io::Error::other)?;
        fs::write(version_dir.join(RECORD_FILE), data)
    }
}

/// Versions present under the versions directory, sorted ascending.
///
/// Only real directories whose name starts with a digit count. Symlinks
/// and staging directories are skipped.
pub fn installed_versions(versions_dir: &Path) -> io::Result<Vec<Version>> {
    let mut versions = Vec::new();

    for entry in fs::read_dir(versions_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            versions.push(Version::new(name));
        }
    }

    versions.sort();
    Ok(versions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record() -> InstallRecord {
        InstallRecord {
            release: ReleaseId::parse("20240415").unwrap(),
            distribution: Distribution::new("x86_64-unknown-linux-gnu"),
            stripped: true,
        }
    }

    #[test]
    fn record_round_trips() {
        let dir = tempdir().unwrap();
        record().save(dir.path()).unwrap();

        assert_eq!(InstallRecord::load(dir.path()), Some(record()));
    }

    #[test]
    fn load_is_none_for_missing_or_corrupt_records() {
        let dir = tempdir().unwrap();
        assert_eq!(InstallRecord::load(dir.path()), None);

        fs::write(dir.path().join(RECORD_FILE), "not json").unwrap();
        assert_eq!(InstallRecord::load(dir.path()), None);
    }

    #[test]
    fn stripped_is_omitted_when_false() {
        let dir = tempdir().unwrap();
        let mut rec = record();
        rec.stripped = false;
        rec.save(dir.path()).unwrap();

        let data = fs::read_to_string(dir.path().join(RECORD_FILE)).unwrap();
        assert!(!data.contains("stripped"));
        assert_eq!(InstallRecord::load(dir.path()), Some(rec));
    }

    #[cfg(unix)]
    #[test]
    fn installed_versions_skips_links_and_staging_dirs() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("3.12.3")).unwrap();
        fs::create_dir(dir.path().join("3.11.0")).unwrap();
        fs::create_dir(dir.path().join(".3.13.0-tmp")).unwrap();
        fs::write(dir.path().join(".lock"), "").unwrap();
        std::os::unix::fs::symlink("3.12.3", dir.path().join("3.12")).unwrap();

        let versions = installed_versions(dir.path()).unwrap();
        assert_eq!(versions, ["3.11.0", "3.12.3"]);
    }
}
