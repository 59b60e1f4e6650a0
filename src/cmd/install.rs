//! Install command

use anyhow::{Result, bail};

use pyvm::ops::{self, Context, InstallError};
use pyvm::types::{ReleaseId, Version};

/// Install one or more versions from a release.
#[allow(clippy::too_many_arguments)]
pub async fn install(
    ctx: &Context,
    release: Option<&ReleaseId>,
    all: bool,
    all_prerelease: bool,
    skip: &[String],
    force: bool,
    include_source: bool,
    versions: &[String],
) -> Result<()> {
    let (release, catalog) = super::load_release(ctx, release).await?;
    let matcher = catalog.matcher();

    let all = all || all_prerelease;
    let targets: Vec<Version> = if all {
        if !versions.is_empty() {
            bail!("Can not specify versions with --all, use --skip instead.");
        }
        let skipped: Vec<Version> = skip
            .iter()
            .filter_map(|s| matcher.resolve(Some(s), false).cloned())
            .collect();
        catalog
            .versions()
            .filter(|v| all_prerelease || v.is_formal())
            .filter(|v| !skipped.contains(v))
            .cloned()
            .collect()
    } else {
        if !skip.is_empty() {
            bail!("--skip can only be specified with --all.");
        }
        if versions.is_empty() {
            bail!("Must specify at least one version, or --all.");
        }
        let mut picked = Vec::new();
        for spec in versions {
            let version = matcher.resolve(Some(spec), false).cloned().ok_or_else(|| {
                InstallError::VersionNotFound {
                    version: spec.clone(),
                    release: release.clone(),
                }
            })?;
            picked.push(version);
        }
        picked
    };

    for version in &targets {
        let result = ops::install::install_version(
            ctx,
            &catalog,
            version,
            &release,
            &ctx.settings.distribution,
            include_source,
            force,
        )
        .await;
        match result {
            Ok(()) => println!("{version} installed."),
            Err(e @ InstallError::AlreadyInstalled(_)) => eprintln!("{e}"),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
