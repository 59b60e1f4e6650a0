//! pyvm - A Python Version Manager
//!
//! Installs and manages standalone CPython builds published by the
//! python-build-standalone project.
//!
//! # Overview
//!
//! pyvm resolves version specifiers like `3.12` against a release's asset
//! list, downloads the matching archive for the selected build distribution,
//! and unpacks it under a per-user home. Minor symlinks such as `3.12` always
//! point at the newest installed patch, so tools can hold a stable path
//! across upgrades.
//!
//! # Architecture
//!
//! - **Typestate Pattern**: The install flow uses `ResolvedInstall` →
//!   `StagedInstall` to enforce fetch, unpack, and activation ordering at
//!   compile time. Activation is an atomic rename, so a version directory
//!   either exists completely or not at all.
//! - **Newtypes**: `Version`, `ReleaseId`, and `Distribution` carry the
//!   parsing, ordering, and validation rules of their strings.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.pyvm/
//! ├── versions/             # One directory per installed version
//! │   ├── 3.12 -> 3.12.3    # Minor symlink to the newest patch
//! │   └── 3.12.3/           # Unpacked build plus its pyvm.json record
//! └── cache/
//!     ├── downloads/        # Archives, one subdirectory per release tag
//!     ├── releases/         # Cached asset listings, one file per tag
//!     └── latest_release    # Latest tag with the time it was fetched
//! ```

pub mod core;
pub mod io;
pub mod ops;
pub mod registry;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use ops::{Context, Dirs, Settings};
pub use types::{Distribution, ReleaseId, Version};

use dirs::home_dir;
use std::path::PathBuf;

/// Returns the primary data directory, or None if the user's home cannot be resolved.
pub fn try_pyvm_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("PYVM_HOME") {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".pyvm"))
}

/// Returns the canonical pyvm home directory (`~/.pyvm`).
///
/// # Panics
/// Panics if the home directory cannot be determined.
pub fn pyvm_home() -> PathBuf {
    try_pyvm_home().expect("Could not determine home directory")
}

/// Extract the filename from a URL, decoding percent escapes.
///
/// Standalone build archives carry a `+` in their names, which release
/// asset URLs encode as `%2B`.
///
/// # Example
///
/// ```
/// use pyvm::filename_from_url;
///
/// assert_eq!(
///     filename_from_url("https://example.com/dl/cpython-3.12.3%2B20240415.tar.zst"),
///     "cpython-3.12.3+20240415.tar.zst"
/// );
/// assert_eq!(filename_from_url(""), "");
/// ```
pub fn filename_from_url(url: &str) -> String {
    let name = url.split('/').next_back().unwrap_or("");

    let mut out = Vec::with_capacity(name.len());
    let mut rest = name.as_bytes();
    while let Some(&byte) = rest.first() {
        if byte == b'%' && rest.len() >= 3 {
            if let Some(decoded) = decode_hex_pair(rest[1], rest[2]) {
                out.push(decoded);
                rest = &rest[3..];
                continue;
            }
        }
        out.push(byte);
        rest = &rest[1..];
    }

    // Invalid escapes are kept verbatim, so this only fails on input that
    // was not valid UTF-8 percent-encoding to begin with.
    String::from_utf8(out).unwrap_or_else(|_| name.to_string())
}

fn decode_hex_pair(hi: u8, lo: u8) -> Option<u8> {
    let hi = (hi as char).to_digit(16)?;
    let lo = (lo as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

/// User Agent string
pub const USER_AGENT: &str = concat!("pyvm/", env!("CARGO_PKG_VERSION"));
