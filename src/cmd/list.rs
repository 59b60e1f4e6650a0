//! List command

use anyhow::Result;

use pyvm::ops::Context;
use pyvm::store::{self, InstallRecord};
use pyvm::types::ReleaseId;

/// List installed versions and show which have an update available.
pub async fn list(
    ctx: &Context,
    verbose: bool,
    release: Option<&ReleaseId>,
    versions: &[String],
) -> Result<()> {
    let (release, catalog) = super::load_release(ctx, release).await?;
    let matcher = catalog.matcher();

    let installed = store::installed_versions(&ctx.dirs.versions)?;
    let all = versions.is_empty();
    for version in super::select_versions(&installed, all, versions, &[])? {
        let Some(record) = InstallRecord::load(&ctx.dirs.version_dir(&version)) else {
            continue;
        };

        let mut updatable = String::new();
        let mut reason = String::new();
        if record.release != release {
            match matcher.resolve(Some(version.as_str()), true) {
                None => {
                    if verbose {
                        reason = format!(
                            " not eligible for update because release {release} \
                             does not provide this version."
                        );
                    }
                }
                Some(next) => {
                    let next_dir = ctx.dirs.version_dir(next);
                    if *next != version && next_dir.exists() {
                        if verbose {
                            let from = InstallRecord::load(&next_dir)
                                .map(|r| r.release.to_string())
                                .unwrap_or_else(|| "?".to_string());
                            reason = format!(
                                " not eligible for update because {next} @ {from} \
                                 is already installed."
                            );
                        }
                    } else if catalog.url(next, &record.distribution).is_some() {
                        updatable = format!(" updatable to {next} @ {release}");
                    } else if verbose {
                        reason = format!(
                            " not eligible for update because {next} @ {release} \
                             does not provide distribution=\"{}\".",
                            record.distribution
                        );
                    }
                }
            }
        }

        let stripped = if record.stripped { " stripped" } else { "" };
        println!(
            "{version} @ {}{updatable} distribution=\"{}\"{stripped}{reason}",
            record.release, record.distribution
        );
    }

    Ok(())
}
