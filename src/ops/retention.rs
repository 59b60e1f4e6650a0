//! Cache retention: keep markers for installed releases, purge the rest.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::time::SystemTime;

use tracing::debug;

use crate::ops::Dirs;
use crate::store::{self, InstallRecord};

/// Release tags the cache must keep: those of installed versions plus the
/// cached latest tag, fresh or not.
pub fn keep_set(dirs: &Dirs) -> HashSet<String> {
    let mut keep = HashSet::new();

    if let Ok(versions) = store::installed_versions(&dirs.versions) {
        for version in versions {
            if let Some(record) = InstallRecord::load(&dirs.version_dir(&version)) {
                keep.insert(record.release.to_string());
            }
        }
    }

    if let Ok(data) = fs::read_to_string(&dirs.latest_release) {
        let tag = data.trim();
        if !tag.is_empty() {
            keep.insert(tag.to_string());
        }
    }

    keep
}

/// Drop cached release markers past their grace period, then any download
/// directories for releases outside the final keep set.
///
/// A marker inside its grace period keeps its downloads too. `purge_days`
/// of zero disables purging entirely.
pub fn purge_unused(dirs: &Dirs, purge_days: i64) -> io::Result<()> {
    if purge_days == 0 {
        return Ok(());
    }

    let mut keep = keep_set(dirs);
    let grace = purge_days.saturating_mul(86_400);
    let now = SystemTime::now();

    for entry in fs::read_dir(&dirs.releases)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if keep.contains(name) {
            continue;
        }
        if age_secs(&entry, now) > grace {
            debug!("purging stale release marker {name}");
            fs::remove_file(entry.path())?;
        } else {
            keep.insert(name.to_string());
        }
    }

    for entry in fs::read_dir(&dirs.downloads)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !keep.contains(name) {
            debug!("purging downloads for release {name}");
            fs::remove_dir_all(entry.path())?;
        }
    }

    Ok(())
}

fn age_secs(entry: &fs::DirEntry, now: SystemTime) -> i64 {
    let modified = entry.metadata().and_then(|m| m.modified()).unwrap_or(now);
    match now.duration_since(modified) {
        Ok(age) => age.as_secs() as i64,
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::tempdir;

    use crate::types::{Distribution, ReleaseId, Version};

    fn dirs(home: &std::path::Path) -> Dirs {
        let dirs = Dirs::new(home);
        dirs.ensure().unwrap();
        dirs
    }

    fn install(dirs: &Dirs, version: &str, release: &str) {
        let vdir = dirs.version_dir(&Version::new(version));
        fs::create_dir_all(&vdir).unwrap();
        InstallRecord {
            release: ReleaseId::parse(release).unwrap(),
            distribution: Distribution::new("x86_64-unknown-linux-gnu"),
            stripped: false,
        }
        .save(&vdir)
        .unwrap();
    }

    fn seed_marker(dirs: &Dirs, name: &str, age_days: u64) {
        let path = dirs.releases.join(name);
        fs::write(&path, "{}").unwrap();
        let modified = SystemTime::now() - Duration::from_secs(age_days * 86_400);
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(modified)
            .unwrap();
    }

    #[test]
    fn keep_set_covers_installed_releases_and_latest() {
        let home = tempdir().unwrap();
        let dirs = dirs(home.path());
        install(&dirs, "3.12.3", "20240415");
        fs::write(&dirs.latest_release, "20240601\n").unwrap();

        let keep = keep_set(&dirs);
        assert!(keep.contains("20240415"));
        assert!(keep.contains("20240601"));
        assert_eq!(keep.len(), 2);
    }

    #[test]
    fn version_dirs_without_records_keep_nothing() {
        let home = tempdir().unwrap();
        let dirs = dirs(home.path());
        fs::create_dir_all(dirs.version_dir(&Version::new("3.12.3"))).unwrap();

        assert!(keep_set(&dirs).is_empty());
    }

    #[test]
    fn stale_markers_and_their_downloads_are_purged() {
        let home = tempdir().unwrap();
        let dirs = dirs(home.path());
        seed_marker(&dirs, "20230101", 120);
        fs::create_dir_all(dirs.downloads.join("20230101")).unwrap();

        purge_unused(&dirs, 90).unwrap();

        assert!(!dirs.releases.join("20230101").exists());
        assert!(!dirs.downloads.join("20230101").exists());
    }

    #[test]
    fn markers_in_grace_keep_their_downloads() {
        let home = tempdir().unwrap();
        let dirs = dirs(home.path());
        seed_marker(&dirs, "20240415", 10);
        fs::create_dir_all(dirs.downloads.join("20240415")).unwrap();

        purge_unused(&dirs, 90).unwrap();

        assert!(dirs.releases.join("20240415").exists());
        assert!(dirs.downloads.join("20240415").exists());
    }

    #[test]
    fn installed_releases_survive_any_age() {
        let home = tempdir().unwrap();
        let dirs = dirs(home.path());
        install(&dirs, "3.12.3", "20230101");
        seed_marker(&dirs, "20230101", 400);
        fs::create_dir_all(dirs.downloads.join("20230101")).unwrap();

        purge_unused(&dirs, 90).unwrap();

        assert!(dirs.releases.join("20230101").exists());
        assert!(dirs.downloads.join("20230101").exists());
    }

    #[test]
    fn downloads_without_markers_are_purged() {
        let home = tempdir().unwrap();
        let dirs = dirs(home.path());
        fs::create_dir_all(dirs.downloads.join("20230101")).unwrap();

        purge_unused(&dirs, 90).unwrap();

        assert!(!dirs.downloads.join("20230101").exists());
    }

    #[test]
    fn zero_days_disables_purging() {
        let home = tempdir().unwrap();
        let dirs = dirs(home.path());
        seed_marker(&dirs, "20230101", 400);
        fs::create_dir_all(dirs.downloads.join("20230101")).unwrap();

        purge_unused(&dirs, 0).unwrap();

        assert!(dirs.releases.join("20230101").exists());
        assert!(dirs.downloads.join("20230101").exists());
    }

    #[test]
    fn old_marker_touched_on_remove_regains_grace() {
        let home = tempdir().unwrap();
        let dirs = dirs(home.path());
        install(&dirs, "3.12.3", "20230101");
        seed_marker(&dirs, "20230101", 400);

        crate::ops::remove::remove_version(&dirs, &Version::new("3.12.3")).unwrap();
        purge_unused(&dirs, 90).unwrap();

        assert!(dirs.releases.join("20230101").exists());
    }
}
