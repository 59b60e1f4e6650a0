//! Shared operation context.
//!
//! This module defines the `Context` struct, which groups the registry
//! client, directory layout, and settings used throughout the version
//! operations to reduce argument fatigue.

use std::io;
use std::path::{Path, PathBuf};

use crate::registry::Registry;
use crate::types::{Distribution, ReleaseId, Version};

/// Directory layout under the pyvm home.
#[derive(Debug, Clone)]
pub struct Dirs {
    pub versions: PathBuf,
    pub cache: PathBuf,
    pub downloads: PathBuf,
    pub releases: PathBuf,
    pub latest_release: PathBuf,
}

impl Dirs {
    pub fn new(home: &Path) -> Self {
        let versions = home.join("versions");
        let cache = home.join("cache");
        let downloads = cache.join("downloads");
        let releases = cache.join("releases");
        let latest_release = cache.join("latest_release");

        Self {
            versions,
            cache,
            downloads,
            releases,
            latest_release,
        }
    }

    /// Create the directories every command expects to exist.
    pub fn ensure(&self) -> io::Result<()> {
        for dir in [&self.versions, &self.cache, &self.downloads, &self.releases] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Directory an installed version lives in.
    pub fn version_dir(&self, version: &Version) -> PathBuf {
        self.versions.join(version)
    }

    /// Staging directory a version is unpacked into before activation.
    pub fn staging_dir(&self, version: &Version) -> PathBuf {
        self.versions.join(format!(".{version}-tmp"))
    }

    /// Cached asset catalog for a release.
    pub fn release_catalog(&self, release: &ReleaseId) -> PathBuf {
        self.releases.join(release)
    }

    /// Download cache for a release's archives.
    pub fn release_downloads(&self, release: &ReleaseId) -> PathBuf {
        self.downloads.join(release)
    }
}

/// Settings shared by every command, mostly from global CLI flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub distribution: Distribution,
    pub cache_minutes: f64,
    pub purge_days: i64,
    pub no_strip: bool,
}

/// Groups common state used during version operations.
#[derive(Debug, Clone)]
pub struct Context {
    pub registry: Registry,
    pub dirs: Dirs,
    pub settings: Settings,
}

impl Context {
    pub fn new(registry: Registry, dirs: Dirs, settings: Settings) -> Self {
        Self {
            registry,
            dirs,
            settings,
        }
    }
}
