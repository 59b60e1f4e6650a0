//! Release and catalog resolution, backed by the cache directory.

use std::path::Path;
use std::time::SystemTime;

use tokio::fs;
use tracing::debug;

use crate::core::ReleaseCatalog;
use crate::ops::{Context, InstallError};
use crate::types::ReleaseId;

/// Resolve the release to operate on.
///
/// An explicit release wins. Otherwise the cached latest tag is reused
/// while fresh, and refreshed from the registry when stale or missing.
pub async fn resolve_release(
    ctx: &Context,
    explicit: Option<&ReleaseId>,
) -> Result<ReleaseId, InstallError> {
    if let Some(release) = explicit {
        return Ok(release.clone());
    }

    let path = &ctx.dirs.latest_release;
    if is_fresh(path, ctx.settings.cache_minutes).await {
        if let Ok(data) = fs::read_to_string(path).await {
            if let Ok(release) = ReleaseId::parse(data.trim()) {
                return Ok(release);
            }
        }
    }

    let release = ctx.registry.latest_tag().await?;
    debug!("latest release is {release}");
    fs::write(path, format!("{release}\n")).await?;

    Ok(release)
}

async fn is_fresh(path: &Path, cache_minutes: f64) -> bool {
    let Ok(metadata) = fs::metadata(path).await else {
        return false;
    };
    let Ok(modified) = metadata.modified() else {
        return true;
    };
    match SystemTime::now().duration_since(modified) {
        Ok(age) => age.as_secs_f64() < cache_minutes * 60.0,
        Err(_) => true,
    }
}

/// Load the asset catalog for `release`, from cache when possible.
///
/// A cached catalog is trusted regardless of age. An empty one is
/// authoritative: the release really offered nothing usable.
pub async fn load_catalog(
    ctx: &Context,
    release: &ReleaseId,
) -> Result<ReleaseCatalog, InstallError> {
    let path = ctx.dirs.release_catalog(release);

    if let Ok(data) = fs::read_to_string(&path).await {
        if let Ok(catalog) = serde_json::from_str(&data) {
            return Ok(catalog);
        }
    }

    let published = ctx.registry.release_by_tag(release).await?;
    let catalog = ReleaseCatalog::from_assets(
        published
            .assets
            .iter()
            .map(|a| (a.name.as_str(), a.browser_download_url.as_str())),
        release,
    );
    debug!("release {release} offers {} versions", catalog.versions().count());

    let data = serde_json::to_string(&catalog).map_err(std::io::Error::other)?;
    fs::write(&path, data).await?;

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{Dirs, Settings};
    use crate::registry::Registry;
    use crate::types::Distribution;
    use tempfile::tempdir;

    fn settings(cache_minutes: f64) -> Settings {
        Settings {
            distribution: Distribution::new("x86_64-unknown-linux-gnu"),
            cache_minutes,
            purge_days: 90,
            no_strip: false,
        }
    }

    fn offline_context(home: &Path) -> Context {
        let dirs = Dirs::new(home);
        dirs.ensure().unwrap();
        Context::new(Registry::new(None).unwrap(), dirs, settings(60.0))
    }

    #[tokio::test]
    async fn explicit_release_wins() {
        let home = tempdir().unwrap();
        let ctx = offline_context(home.path());
        let release = ReleaseId::parse("20240415").unwrap();

        let resolved = resolve_release(&ctx, Some(&release)).await.unwrap();
        assert_eq!(resolved, release);
    }

    #[tokio::test]
    async fn fresh_cached_tag_is_reused() {
        let home = tempdir().unwrap();
        let ctx = offline_context(home.path());
        std::fs::write(&ctx.dirs.latest_release, "20240415\n").unwrap();

        let resolved = resolve_release(&ctx, None).await.unwrap();
        assert_eq!(resolved, "20240415");
    }

    #[tokio::test]
    async fn stale_tag_is_refreshed_from_the_registry() {
        let mut server = mockito::Server::new_async().await;
        let _redirect = server
            .mock("GET", "/astral-sh/python-build-standalone/releases/latest")
            .with_status(302)
            .with_header(
                "location",
                &format!(
                    "{}/astral-sh/python-build-standalone/releases/tag/20240601",
                    server.url()
                ),
            )
            .create_async()
            .await;
        let _tag_page = server
            .mock("GET", "/astral-sh/python-build-standalone/releases/tag/20240601")
            .with_status(200)
            .create_async()
            .await;

        let home = tempdir().unwrap();
        let dirs = Dirs::new(home.path());
        dirs.ensure().unwrap();
        let ctx = Context::new(
            Registry::with_bases(server.url(), server.url()),
            dirs,
            settings(0.0),
        );
        std::fs::write(&ctx.dirs.latest_release, "20240415\n").unwrap();

        let resolved = resolve_release(&ctx, None).await.unwrap();
        assert_eq!(resolved, "20240601");

        let cached = std::fs::read_to_string(&ctx.dirs.latest_release).unwrap();
        assert_eq!(cached.trim(), "20240601");
    }

    #[tokio::test]
    async fn cached_catalog_is_reused_even_when_empty() {
        let home = tempdir().unwrap();
        let ctx = offline_context(home.path());
        let release = ReleaseId::parse("20240415").unwrap();
        std::fs::write(ctx.dirs.release_catalog(&release), "{}").unwrap();

        let catalog = load_catalog(&ctx, &release).await.unwrap();
        assert!(catalog.is_empty());
    }
}
