//! Domain-specific errors for version operations

use thiserror::Error;

use crate::io::download::DownloadError;
use crate::io::extract::ExtractError;
use crate::registry::github::RegistryError;
use crate::types::{Distribution, ReleaseId, Version};

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Version {version} @ {release} not found.")]
    VersionNotFound { version: String, release: ReleaseId },

    #[error("Arch \"{distribution}\" not found for release {release} version {version}.")]
    NotOffered {
        distribution: Distribution,
        release: ReleaseId,
        version: Version,
    },

    #[error("Failed to fetch \"{url}\": {source}")]
    Fetch { url: String, source: DownloadError },

    #[error("Failed to unpack \"{url}\": {source}")]
    Unpack { url: String, source: ExtractError },

    #[error("Failed to write {version} data file: {source}")]
    Metadata {
        version: Version,
        source: std::io::Error,
    },

    #[error("Version {0} is already installed.")]
    AlreadyInstalled(Version),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Task(String),
}
