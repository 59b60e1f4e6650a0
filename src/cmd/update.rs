//! Update command

use anyhow::Result;

use pyvm::ops::{self, Context};
use pyvm::store::{self, InstallRecord};
use pyvm::types::ReleaseId;

/// Update installed versions to what a newer release offers.
pub async fn update(
    ctx: &Context,
    release: Option<&ReleaseId>,
    all: bool,
    skip: &[String],
    keep: bool,
    versions: &[String],
) -> Result<()> {
    let (release, catalog) = super::load_release(ctx, release).await?;
    let matcher = catalog.matcher();

    let installed = store::installed_versions(&ctx.dirs.versions)?;
    for version in super::select_versions(&installed, all, versions, skip)? {
        let vdir = ctx.dirs.version_dir(&version);
        let Some(record) = InstallRecord::load(&vdir) else {
            continue;
        };
        if record.release == release {
            continue;
        }

        let Some(next) = matcher.resolve(Some(version.as_str()), true).cloned() else {
            continue;
        };
        // Updates keep the distribution the version was installed
        // with, which a newer release may no longer offer.
        if catalog.url(&next, &record.distribution).is_none() {
            continue;
        }
        if next == version && keep {
            eprintln!(
                "Error: {version} @ {} would not be kept if updated to {next} @ {release} \
                 distribution=\"{}\"",
                record.release, record.distribution
            );
            continue;
        }
        if next != version && ctx.dirs.version_dir(&next).exists() {
            continue;
        }

        let include_source = vdir.join("src").is_dir();
        ops::install::install_version(
            ctx,
            &catalog,
            &next,
            &release,
            &record.distribution,
            include_source,
            true,
        )
        .await?;
        println!("Updated {version} to {next} @ {release}.");

        if next != version && !keep {
            ops::remove::remove_version(&ctx.dirs, &version)?;
        }
    }

    Ok(())
}
