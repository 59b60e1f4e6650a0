//! Debug-symbol stripping for unpacked interpreter trees.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::types::Distribution;

/// Strip unneeded symbols from the libraries under `root/lib`.
///
/// Only applies to Linux builds running on Linux, and only when a `strip`
/// binary is on the PATH. Returns whether anything was stripped.
pub fn strip_libraries(root: &Path, distribution: &Distribution) -> bool {
    if !cfg!(target_os = "linux") || !distribution.as_str().contains("-linux-") {
        return false;
    }
    if which::which("strip").is_err() {
        debug!("no strip binary on PATH, skipping");
        return false;
    }

    let lib_dir = root.join("lib");
    let entries = match fs::read_dir(&lib_dir) {
        Ok(entries) => entries,
        Err(_) => return false,
    };

    let mut stripped = false;
    for entry in entries.flatten() {
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(_) => continue,
        };
        // symlinks would strip the same file twice
        if !file_type.is_file() {
            continue;
        }
        let status = Command::new("strip")
            .args(["-p", "--strip-unneeded"])
            .arg(entry.path())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if status.is_ok() {
            stripped = true;
        }
    }

    stripped
}
