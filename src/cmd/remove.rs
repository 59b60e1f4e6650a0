//! Remove command

use anyhow::Result;

use pyvm::ops::{self, Context};
use pyvm::store::{self, InstallRecord};
use pyvm::types::ReleaseId;

/// Remove installed versions, optionally only those from one release.
pub fn remove(
    ctx: &Context,
    all: bool,
    skip: &[String],
    release: Option<&ReleaseId>,
    versions: &[String],
) -> Result<()> {
    let installed = store::installed_versions(&ctx.dirs.versions)?;
    for version in super::select_versions(&installed, all, versions, skip)? {
        let record = InstallRecord::load(&ctx.dirs.version_dir(&version));
        if let Some(wanted) = release {
            if record.as_ref().map(|r| &r.release) != Some(wanted) {
                continue;
            }
        }
        let from = record
            .as_ref()
            .map(|r| r.release.as_str())
            .unwrap_or("?")
            .to_string();

        ops::remove::remove_version(&ctx.dirs, &version)?;
        println!("{version} @ {from} removed.");
    }

    Ok(())
}
