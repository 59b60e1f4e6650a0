//! Show command

use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use anyhow::Result;
use chrono::DateTime;
use regex::Regex;

use pyvm::ops::{self, Context};
use pyvm::store::{self, InstallRecord};
use pyvm::types::ReleaseId;

/// Show versions available from a release, or recent releases.
pub async fn show(
    ctx: &Context,
    list: bool,
    release: Option<&ReleaseId>,
    all: bool,
    matching: Option<&str>,
) -> Result<()> {
    let pattern = matching.map(Regex::new).transpose()?;

    if list {
        return show_releases(ctx, pattern.as_ref()).await;
    }

    let (release, catalog) = super::load_release(ctx, release).await?;

    // Versions installed from this release, by distribution.
    let mut installed = BTreeMap::new();
    for version in store::installed_versions(&ctx.dirs.versions)? {
        if let Some(record) = InstallRecord::load(&ctx.dirs.version_dir(&version)) {
            if record.release == release {
                installed.insert(version, record.distribution);
            }
        }
    }

    let wanted = &ctx.settings.distribution;
    let mut installable = false;
    for version in catalog.versions() {
        let Some(distributions) = catalog.distributions(version) else {
            continue;
        };
        for distribution in distributions.keys() {
            let marker = if installed.get(version) == Some(distribution) {
                " (installed)"
            } else {
                ""
            };
            if !all && marker.is_empty() && distribution != wanted {
                continue;
            }
            if distribution == wanted {
                installable = true;
            }
            if let Some(re) = &pattern {
                if !re.is_match(&format!("{version}+{distribution}")) {
                    continue;
                }
            }
            println!("{version} @ {release} distribution=\"{distribution}\"{marker}");
        }
    }

    if !installable {
        println!("Warning: no distribution=\"{wanted}\" versions found in release \"{release}\".");
    }

    Ok(())
}

/// List recent upstream releases alongside local cache state.
async fn show_releases(ctx: &Context, pattern: Option<&Regex>) -> Result<()> {
    let latest = ops::resolve::resolve_release(ctx, None).await?;

    let mut dates = BTreeMap::new();
    for release in ctx.registry.recent_releases().await? {
        dates.insert(release.tag_name.clone(), release.published_at);
    }

    let mut cached = BTreeSet::new();
    if let Ok(entries) = fs::read_dir(&ctx.dirs.releases) {
        for entry in entries.flatten() {
            if let Some(name) = entry.file_name().to_str() {
                cached.insert(name.to_string());
            }
        }
    }

    let mut tags: BTreeSet<String> = dates.keys().cloned().collect();
    tags.extend(cached.iter().cloned());

    for tag in &tags {
        if let Some(re) = pattern {
            if !re.is_match(tag) {
                continue;
            }
        }

        let date = dates
            .get(tag)
            .and_then(|d| d.as_deref())
            .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
            .map(|d| d.format("%Y-%m-%d_%H:%M").to_string())
            .unwrap_or_else(|| ".".repeat(16));

        let mut annotation = String::new();
        if cached.contains(tag) {
            let count = fs::read_dir(ctx.dirs.downloads.join(tag))
                .map(|entries| entries.count())
                .unwrap_or(0);
            annotation = if count > 0 {
                format!(" cached + {count} downloaded files")
            } else {
                " cached".to_string()
            };
        }

        let pre = match ReleaseId::parse(tag) {
            Ok(tag) if tag > latest => " pre-release",
            _ => "",
        };

        println!("{tag} {date}{annotation}{pre}");
    }

    Ok(())
}
