//! Path command

use anyhow::{Result, bail};

use pyvm::ops::Context;

/// Print the path to an installed version, the versions directory, or
/// the cache directory.
pub fn path(
    ctx: &Context,
    python_path: bool,
    resolve: bool,
    cache_path: bool,
    version: Option<&str>,
) -> Result<()> {
    let Some(version) = version.filter(|_| !cache_path) else {
        if python_path {
            bail!("Can not specify --python-path.");
        }
        let dir = if cache_path {
            &ctx.dirs.cache
        } else {
            &ctx.dirs.versions
        };
        println!("{}", dir.display());
        return Ok(());
    };

    // Symlink names like `3.12` are valid version arguments here.
    let mut path = ctx.dirs.versions.join(version);
    if !path.exists() {
        bail!("Version {version} is not installed.");
    }

    if resolve {
        path = path.canonicalize()?;
    }

    if python_path {
        let base = path;
        path = base.join("bin").join("python");
        if !path.exists() {
            path = base.join("python.exe");
            if !path.exists() {
                bail!("Can not find python executable in \"{}\"", base.display());
            }
        }
    }

    println!("{}", path.display());
    Ok(())
}
