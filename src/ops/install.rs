//! Version installation operations.
//!
//! The main entry point is [`install_version`], which runs the staged
//! pipeline from [`crate::ops::flow`] for a single version: locate the
//! archive, fetch and unpack it, then activate it with an atomic rename.

use crate::core::ReleaseCatalog;
use crate::ops::flow::ResolvedInstall;
use crate::ops::{Context, InstallError};
use crate::types::{Distribution, ReleaseId, Version};

/// Install one version from `catalog`.
///
/// An existing version directory is an error unless `force` is set, in
/// which case it is replaced during activation.
pub async fn install_version(
    ctx: &Context,
    catalog: &ReleaseCatalog,
    version: &Version,
    release: &ReleaseId,
    distribution: &Distribution,
    include_source: bool,
    force: bool,
) -> Result<(), InstallError> {
    if !force && ctx.dirs.version_dir(version).exists() {
        return Err(InstallError::AlreadyInstalled(version.clone()));
    }

    ResolvedInstall::new(catalog, version, release, distribution, include_source)?
        .stage(ctx)
        .await?
        .activate(ctx)
        .await
}
