//! uv/uvx passthrough commands

use std::fs;
use std::process::Command;

use anyhow::{Result, bail};

use pyvm::ops::Context;

/// Run `uv` or `uvx` against an installed interpreter, forwarding the
/// remaining arguments and the child's exit code.
pub fn uv(ctx: &Context, python: Option<&str>, args: &[String], tool: &str) -> Result<i32> {
    let vers = match python {
        Some(v) => v.to_string(),
        None => match latest_major(ctx) {
            Some(v) => v,
            None => bail!("No installed python version found."),
        },
    };

    let mut py = ctx.dirs.versions.join(&vers);
    if !py.is_dir() {
        bail!("No installed python {vers} version found.");
    }

    // A bare major name is resolved through its symlink and then
    // re-expressed as the minor link, so environments created against
    // it survive patch upgrades.
    if !vers.contains('.') {
        py = py.canonicalize()?;
        if let Some(stem) = py.file_stem() {
            py = py.with_file_name(stem);
        }
    }

    let Ok(tool_path) = which::which(tool) else {
        bail!("{tool} not found on PATH.");
    };

    let status = Command::new(tool_path).arg("-p").arg(&py).args(args).status()?;
    Ok(status.code().unwrap_or(1))
}

/// Highest installed major version link (`3` to `9`).
fn latest_major(ctx: &Context) -> Option<String> {
    let mut majors: Vec<String> = fs::read_dir(&ctx.dirs.versions)
        .ok()?
        .flatten()
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|n| matches!(n.as_bytes(), [b'3'..=b'9']))
        .collect();
    majors.sort();
    majors.pop()
}
