//! Cache command

use std::fs;
use std::path::Path;

use anyhow::{Result, bail};
use walkdir::WalkDir;

use pyvm::ops::{Context, retention};
use pyvm::types::ReleaseId;

/// Show the size of the release download caches, or remove them.
pub fn cache(
    ctx: &Context,
    no_total: bool,
    no_human_readable: bool,
    remove: bool,
    remove_all_unused: bool,
    releases: &[ReleaseId],
) -> Result<()> {
    let downloads = &ctx.dirs.downloads;

    if remove_all_unused {
        let keep = retention::keep_set(&ctx.dirs);
        for entry in fs::read_dir(downloads)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if keep.contains(name) || !name.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            fs::remove_dir_all(entry.path())?;
            println!("Removed cache for release {name}.");
        }
        return Ok(());
    }

    if !releases.is_empty() {
        let mut total = 0;
        for release in releases {
            let path = downloads.join(release);
            if !path.exists() {
                bail!("No cache for release {release}.");
            }
            if remove {
                fs::remove_dir_all(&path)?;
                println!("Removed cache for release {release}.");
            } else {
                total += show_sizes(&path, no_human_readable)?;
            }
        }
        if !remove && !no_total {
            print_size(total, "TOTAL", no_human_readable);
        }
        return Ok(());
    }

    if remove {
        fs::remove_dir_all(downloads)?;
        fs::create_dir_all(downloads)?;
        println!("Removed download cache.");
        return Ok(());
    }

    let total = show_sizes(downloads, no_human_readable)?;
    if !no_total {
        print_size(total, "TOTAL", no_human_readable);
    }
    Ok(())
}

/// Print a size row for every entry under `path` and return the sum.
fn show_sizes(path: &Path, raw: bool) -> Result<u64> {
    let mut entries: Vec<_> = fs::read_dir(path)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    let mut total = 0;
    for entry in entries {
        let (size, name) = if entry.file_type()?.is_dir() {
            (dir_size(&entry.path()), entry.path().display().to_string())
        } else {
            let name = format!(
                "{}/{}",
                path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
                entry.file_name().to_string_lossy()
            );
            (entry.metadata()?.len(), name)
        };
        total += size;
        print_size(size, &name, raw);
    }
    Ok(total)
}

fn print_size(size: u64, name: &str, raw: bool) {
    let size = if raw {
        format!("{size}B")
    } else {
        format_size(size)
    };
    println!("{size}\t{name}");
}

/// Format bytes for human-readable display.
fn format_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    let mb = kb / 1024.0;
    if mb >= 1024.0 {
        format!("{:.1}G", mb / 1024.0)
    } else if kb >= 1024.0 {
        format!("{mb:.1}M")
    } else if kb >= 1.0 {
        format!("{kb:.1}K")
    } else {
        format!("{bytes}B")
    }
}

fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .flatten()
        .filter_map(|e| e.metadata().ok())
        .filter(|m| m.is_file())
        .map(|m| m.len())
        .sum()
}
