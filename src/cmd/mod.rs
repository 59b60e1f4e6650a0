//! Command modules - one file per CLI command

use anyhow::{Result, bail};

use pyvm::core::{ReleaseCatalog, VersionMatcher};
use pyvm::ops::{self, Context};
use pyvm::types::{ReleaseId, Version};

pub mod cache;
pub mod install;
pub mod list;
pub mod path;
pub mod remove;
pub mod show;
pub mod update;
pub mod uv;

/// Resolve the release to operate on and load its version catalog.
///
/// An empty catalog means the tag does not exist upstream or carries no
/// usable archives, which every command treats as a hard error.
pub(crate) async fn load_release(
    ctx: &Context,
    release: Option<&ReleaseId>,
) -> Result<(ReleaseId, ReleaseCatalog)> {
    let release = ops::resolve::resolve_release(ctx, release).await?;
    let catalog = ops::resolve::load_catalog(ctx, &release).await?;
    if catalog.is_empty() {
        bail!("Release \"{release}\" not found, or has no compatible files.");
    }
    Ok((release, catalog))
}

/// Pick the installed versions a command should act on.
///
/// Positional and `--skip` specifiers resolve against the installed
/// set, so `3.12` picks the installed `3.12.x`. With `--all` the
/// positional list must be empty and `skip` prunes the selection;
/// otherwise every positional specifier must resolve to an installed
/// version.
pub(crate) fn select_versions(
    installed: &[Version],
    all: bool,
    versions: &[String],
    skip: &[String],
) -> Result<Vec<Version>> {
    let matcher = VersionMatcher::new(installed.iter().cloned());
    let resolve = |spec: &String| {
        matcher
            .resolve(Some(spec), false)
            .cloned()
            .unwrap_or_else(|| Version::from(spec.as_str()))
    };

    if all {
        if !versions.is_empty() {
            bail!("Can not specify versions with --all, use --skip instead.");
        }
        let skipped: Vec<Version> = skip.iter().map(resolve).collect();
        return Ok(installed
            .iter()
            .filter(|v| !skipped.contains(v))
            .cloned()
            .collect());
    }

    if !skip.is_empty() {
        bail!("--skip can only be specified with --all.");
    }
    if versions.is_empty() {
        bail!("Must specify at least one version, or --all.");
    }

    let picked: Vec<Version> = versions.iter().map(resolve).collect();
    let missing: Vec<String> = picked
        .iter()
        .filter(|v| !installed.contains(v))
        .map(|v| v.to_string())
        .collect();
    if !missing.is_empty() {
        bail!("Version(s) \"{}\" not found.", missing.join(", "));
    }

    Ok(picked)
}
