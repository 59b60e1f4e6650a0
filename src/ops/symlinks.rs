//! Major/minor convenience symlinks over the versions directory.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::types::Version;

/// Rebuild the `3` / `3.12` style links so each points at the newest
/// installed version sharing that prefix.
///
/// A formal release always wins over a prerelease; prereleases only claim
/// prefixes no formal release occupies. Links name the full version
/// directory directly, never another link.
pub fn update_version_symlinks(versions_dir: &Path) -> io::Result<()> {
    let mut existing = BTreeMap::new();
    let mut versions = Vec::new();

    for entry in fs::read_dir(versions_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        let file_type = entry.file_type()?;
        if file_type.is_symlink() {
            existing.insert(name.to_string(), fs::read_link(entry.path())?);
        } else if file_type.is_dir() {
            versions.push(Version::new(name));
        }
    }

    let desired = desired_links(&versions);

    for (name, target) in &existing {
        let keep = desired.get(name).is_some_and(|t| Path::new(t) == target);
        if !keep {
            debug!("unlinking {name}");
            fs::remove_file(versions_dir.join(name))?;
        }
    }

    for (name, target) in &desired {
        let already = existing.get(name).is_some_and(|t| t == Path::new(target));
        if !already {
            debug!("linking {name} -> {target}");
            create_link(target, &versions_dir.join(name))?;
        }
    }

    Ok(())
}

/// Map every shortened prefix to the version it should point at.
fn desired_links(versions: &[Version]) -> BTreeMap<String, String> {
    let mut candidates: BTreeMap<String, Vec<&Version>> = BTreeMap::new();

    for version in versions {
        let mut prefix = version.as_str();
        while let Some((head, _)) = prefix.rsplit_once('.') {
            candidates.entry(head.to_string()).or_default().push(version);
            prefix = head;
        }
    }

    let mut desired = BTreeMap::new();
    for (prefix, mut candidates) in candidates {
        if candidates.iter().any(|v| v.is_formal()) {
            candidates.retain(|v| v.is_formal());
        }
        if let Some(newest) = candidates.into_iter().max() {
            desired.insert(prefix, newest.as_str().to_string());
        }
    }

    desired
}

#[cfg(unix)]
fn create_link(target: &str, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_link(target: &str, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn link_target(dir: &Path, name: &str) -> Option<String> {
        fs::read_link(dir.join(name))
            .ok()
            .map(|p| p.to_string_lossy().into_owned())
    }

    fn seed(dir: &Path, versions: &[&str]) {
        for v in versions {
            fs::create_dir_all(dir.join(v)).unwrap();
        }
    }

    #[test]
    fn links_prefer_newest_formal_version() {
        let dir = tempdir().unwrap();
        seed(dir.path(), &["3.11.0", "3.12.1", "3.12.3", "3.13.0b1"]);

        update_version_symlinks(dir.path()).unwrap();

        assert_eq!(link_target(dir.path(), "3"), Some("3.12.3".into()));
        assert_eq!(link_target(dir.path(), "3.12"), Some("3.12.3".into()));
        assert_eq!(link_target(dir.path(), "3.11"), Some("3.11.0".into()));
        assert_eq!(link_target(dir.path(), "3.13"), Some("3.13.0b1".into()));
    }

    #[test]
    fn rerun_is_idempotent() {
        let dir = tempdir().unwrap();
        seed(dir.path(), &["3.12.3", "3.13.0b1"]);

        update_version_symlinks(dir.path()).unwrap();
        update_version_symlinks(dir.path()).unwrap();

        assert_eq!(link_target(dir.path(), "3"), Some("3.12.3".into()));
        assert_eq!(link_target(dir.path(), "3.13"), Some("3.13.0b1".into()));
    }

    #[test]
    fn links_retarget_after_a_removal() {
        let dir = tempdir().unwrap();
        seed(dir.path(), &["3.12.1", "3.12.3"]);
        update_version_symlinks(dir.path()).unwrap();
        assert_eq!(link_target(dir.path(), "3.12"), Some("3.12.3".into()));

        fs::remove_dir_all(dir.path().join("3.12.3")).unwrap();
        update_version_symlinks(dir.path()).unwrap();

        assert_eq!(link_target(dir.path(), "3.12"), Some("3.12.1".into()));
        assert_eq!(link_target(dir.path(), "3"), Some("3.12.1".into()));
    }

    #[test]
    fn stale_links_are_removed() {
        let dir = tempdir().unwrap();
        seed(dir.path(), &["3.12.3"]);
        std::os::unix::fs::symlink("3.11.9", dir.path().join("3.11")).unwrap();

        update_version_symlinks(dir.path()).unwrap();

        assert!(fs::symlink_metadata(dir.path().join("3.11")).is_err());
        assert_eq!(link_target(dir.path(), "3.12"), Some("3.12.3".into()));
    }

    #[test]
    fn empty_versions_dir_clears_all_links() {
        let dir = tempdir().unwrap();
        std::os::unix::fs::symlink("3.12.3", dir.path().join("3.12")).unwrap();
        std::os::unix::fs::symlink("3.12.3", dir.path().join("3")).unwrap();

        update_version_symlinks(dir.path()).unwrap();

        assert!(fs::symlink_metadata(dir.path().join("3")).is_err());
        assert!(fs::symlink_metadata(dir.path().join("3.12")).is_err());
    }
}
