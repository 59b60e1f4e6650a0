//! GitHub release lookups for the standalone interpreter builds.

use reqwest::header;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::USER_AGENT;
use crate::types::{ReleaseId, ReleaseIdError};

/// Repository the interpreter builds are published under.
pub const GITHUB_REPO: &str = "astral-sh/python-build-standalone";

const API_BASE: &str = "https://api.github.com";
const SITE_BASE: &str = "https://github.com";

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No release tag in redirect target {0}")]
    NoTag(String),

    #[error(transparent)]
    BadTag(#[from] ReleaseIdError),
}

/// One downloadable asset of a published release.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// A published release, as the API reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
    pub published_at: Option<String>,
}

/// Client for the build registry on GitHub.
#[derive(Debug, Clone)]
pub struct Registry {
    client: reqwest::Client,
    api_base: String,
    site_base: String,
}

impl Registry {
    /// Build a client, attaching a bearer token when one is configured.
    pub fn new(token: Option<&str>) -> anyhow::Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));

        if let Some(t) = token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {t}"))?,
            );
        }

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            api_base: API_BASE.to_string(),
            site_base: SITE_BASE.to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_bases(api_base: String, site_base: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base,
            site_base,
        }
    }

    /// The underlying HTTP client, shared with the download path.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Resolve the tag of the latest published release.
    ///
    /// The `releases/latest` page redirects to the tagged release page, so
    /// the tag can be read off the final URL without an API call.
    pub async fn latest_tag(&self) -> Result<ReleaseId, RegistryError> {
        let url = format!("{}/{}/releases/latest", self.site_base, GITHUB_REPO);
        let response = self.client.get(&url).send().await?.error_for_status()?;

        let tag = response
            .url()
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| RegistryError::NoTag(response.url().to_string()))?;

        Ok(ReleaseId::parse(&tag)?)
    }

    /// Fetch the release published under `tag`, with its asset list.
    ///
    /// A tag that does not exist resolves to a release with no assets.
    pub async fn release_by_tag(&self, tag: &ReleaseId) -> Result<Release, RegistryError> {
        let url = format!(
            "{}/repos/{}/releases/tags/{}",
            self.api_base, GITHUB_REPO, tag
        );
        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!("no release published under tag {tag}");
            return Ok(Release {
                tag_name: tag.to_string(),
                assets: Vec::new(),
                published_at: None,
            });
        }

        Ok(response.error_for_status()?.json().await?)
    }

    /// List the most recently published releases, newest first.
    pub async fn recent_releases(&self) -> Result<Vec<Release>, RegistryError> {
        let url = format!(
            "{}/repos/{}/releases?per_page=30",
            self.api_base, GITHUB_REPO
        );
        let releases = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(releases)
    }
}
