//! Version removal and release-marker bookkeeping.

use std::fs;
use std::io;
use std::time::SystemTime;

use tracing::debug;

use crate::ops::Dirs;
use crate::store::InstallRecord;
use crate::types::Version;

/// Delete a version directory.
///
/// When the directory carries an install record, the matching release
/// marker in the cache gets its mtime refreshed first, so the retention
/// grace period restarts from the removal.
pub fn remove_version(dirs: &Dirs, version: &Version) -> io::Result<()> {
    let version_dir = dirs.version_dir(version);
    if !version_dir.exists() {
        return Ok(());
    }

    if let Some(record) = InstallRecord::load(&version_dir) {
        touch_release_marker(dirs, record.release.as_str());
    }

    debug!("removing {}", version_dir.display());
    fs::remove_dir_all(&version_dir)
}

/// Refresh the mtime of a cached release marker, only when one exists.
fn touch_release_marker(dirs: &Dirs, release: &str) {
    if let Ok(file) = fs::File::options().write(true).open(dirs.releases.join(release)) {
        let _ = file.set_modified(SystemTime::now());
    }
}
