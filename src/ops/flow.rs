//! Installation Flow Typestate Pattern
//!
//! Models the install pipeline as a series of explicit state transitions:
//! `ResolvedInstall` -> `StagedInstall` -> activated version directory
//!
//! This enforces at compile-time that a version cannot be activated before
//! its archive has been fetched and unpacked.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::ReleaseCatalog;
use crate::filename_from_url;
use crate::io::download::download;
use crate::io::extract::{ExtractError, extract_archive};
use crate::io::strip::strip_libraries;
use crate::ops::remove::remove_version;
use crate::ops::{Context, Dirs, InstallError};
use crate::store::InstallRecord;
use crate::types::{Distribution, ReleaseId, Version};

/// Scratch directory that is removed on drop.
///
/// Staging lives next to the final version directory; the activation
/// rename must not cross filesystems.
#[derive(Debug)]
struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    fn create(path: PathBuf) -> io::Result<Self> {
        if path.exists() {
            fs::remove_dir_all(&path)?;
        }
        fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                debug!("could not clean up {}: {e}", self.path.display());
            }
        }
    }
}

/// Step 1: a version whose archive URL has been located in the catalog.
#[derive(Debug)]
pub struct ResolvedInstall {
    version: Version,
    release: ReleaseId,
    distribution: Distribution,
    url: String,
    include_source: bool,
}

/// Step 2: a version unpacked into staging, ready to be activated.
#[derive(Debug)]
pub struct StagedInstall {
    scratch: ScratchDir,
    root: PathBuf,
    version: Version,
    release: ReleaseId,
    distribution: Distribution,
    stripped: bool,
}

impl ResolvedInstall {
    /// Look up the archive for `version` on `distribution`.
    pub fn new(
        catalog: &ReleaseCatalog,
        version: &Version,
        release: &ReleaseId,
        distribution: &Distribution,
        include_source: bool,
    ) -> Result<Self, InstallError> {
        let url = catalog
            .url(version, distribution)
            .ok_or_else(|| InstallError::NotOffered {
                distribution: distribution.clone(),
                release: release.clone(),
                version: version.clone(),
            })?;

        Ok(Self {
            version: version.clone(),
            release: release.clone(),
            distribution: distribution.clone(),
            url: url.to_string(),
            include_source,
        })
    }

    /// Fetch the archive, or reuse the cached copy, and unpack it into a
    /// staging directory next to the final location.
    pub async fn stage(self, ctx: &Context) -> Result<StagedInstall, InstallError> {
        let scratch = ScratchDir::create(ctx.dirs.staging_dir(&self.version))?;

        let downloads = ctx.dirs.release_downloads(&self.release);
        fs::create_dir_all(&downloads)?;
        let archive = downloads.join(filename_from_url(&self.url));

        if !archive.exists() {
            debug!("fetching {}", self.url);
            download(ctx.registry.client(), &self.url, &archive)
                .await
                .map_err(|source| InstallError::Fetch {
                    url: self.url.clone(),
                    source,
                })?;
        }

        let url = self.url.clone();
        let scratch_root = scratch.path().to_path_buf();
        let include_source = self.include_source;
        let strip_wanted = !ctx.settings.no_strip;
        let distribution = self.distribution.clone();

        let (root, stripped) = tokio::task::spawn_blocking(move || {
            unpack_and_prepare(
                &archive,
                &scratch_root,
                include_source,
                strip_wanted,
                &distribution,
            )
            .map_err(|source| InstallError::Unpack { url, source })
        })
        .await
        .map_err(|e| InstallError::Task(format!("Task panic: {e}")))??;

        Ok(StagedInstall {
            scratch,
            root,
            version: self.version,
            release: self.release,
            distribution: self.distribution,
            stripped,
        })
    }
}

impl StagedInstall {
    /// Write the install record, then swap the staged tree into place.
    ///
    /// The rename is the last step. Until it happens the previous content
    /// of the version directory is untouched.
    pub async fn activate(self, ctx: &Context) -> Result<(), InstallError> {
        let dirs = ctx.dirs.clone();
        tokio::task::spawn_blocking(move || self.activate_blocking(&dirs))
            .await
            .map_err(|e| InstallError::Task(format!("Task panic: {e}")))?
    }

    fn activate_blocking(self, dirs: &Dirs) -> Result<(), InstallError> {
        let record = InstallRecord {
            release: self.release.clone(),
            distribution: self.distribution.clone(),
            stripped: self.stripped,
        };
        record
            .save(&self.root)
            .map_err(|source| InstallError::Metadata {
                version: self.version.clone(),
                source,
            })?;

        remove_version(dirs, &self.version)?;
        fs::rename(&self.root, dirs.version_dir(&self.version))?;

        Ok(())
    }
}

/// Unpack `archive` into `scratch_root` and return the interpreter root.
///
/// Archives carry a top-level `python/` directory. Full builds nest the
/// usable tree under `python/install/` with sources and build artifacts as
/// siblings; those move into `install/src/` when requested, and are left
/// behind in scratch otherwise.
fn unpack_and_prepare(
    archive: &Path,
    scratch_root: &Path,
    include_source: bool,
    strip_wanted: bool,
    distribution: &Distribution,
) -> Result<(PathBuf, bool), ExtractError> {
    extract_archive(archive, scratch_root)?;

    let mut root = scratch_root.join("python");
    if !root.is_dir() {
        return Err(ExtractError::Layout("python".to_string()));
    }

    let install = root.join("install");
    if install.is_dir() {
        if include_source {
            let src = install.join("src");
            fs::create_dir_all(&src)?;
            for entry in fs::read_dir(&root)? {
                let entry = entry?;
                if entry.file_name() != "install" {
                    fs::rename(entry.path(), src.join(entry.file_name()))?;
                }
            }
        }
        root = install;
    }

    let stripped = strip_wanted && strip_libraries(&root, distribution);

    Ok((root, stripped))
}
