//! pyvm - A Python Version Manager CLI

use std::env::consts;

use anyhow::{Context as _, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pyvm::io::lock::{LockError, RunLock};
use pyvm::ops::{self, Context, Dirs, Settings};
use pyvm::registry::Registry;
use pyvm::types::{Distribution, ReleaseId};

mod cmd;

#[derive(Parser)]
#[command(name = "pyvm")]
#[command(author, version, about = "pyvm - A manager for standalone CPython builds")]
struct Cli {
    /// Build distribution to operate on, defaults to the host platform's
    #[arg(short = 'D', long, global = true, env = "PYVM_DISTRIBUTION")]
    distribution: Option<String>,

    /// Minutes the cached latest release tag stays fresh
    #[arg(
        short = 'M',
        long,
        global = true,
        env = "PYVM_CACHE_MINUTES",
        default_value_t = 60.0
    )]
    cache_minutes: f64,

    /// Days an unused release cache is kept after its last use
    #[arg(long, global = true, env = "PYVM_PURGE_DAYS", default_value_t = 90)]
    purge_days: i64,

    /// GitHub API token, raises the unauthenticated rate limit
    #[arg(long, global = true, env = "PYVM_GITHUB_TOKEN", hide_env_values = true)]
    github_access_token: Option<String>,

    /// Leave debug symbols in the shared libraries of new installs
    #[arg(long, global = true, env = "PYVM_NO_STRIP")]
    no_strip: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install one or more python versions
    Install {
        /// Release to install from, defaults to the latest
        #[arg(short, long)]
        release: Option<ReleaseId>,

        /// Install every formal version the release provides
        #[arg(short, long)]
        all: bool,

        /// Install every version the release provides, pre-releases included
        #[arg(short = 'A', long)]
        all_prerelease: bool,

        /// Version to leave out of an --all install
        #[arg(long, value_name = "VERSION")]
        skip: Vec<String>,

        /// Reinstall versions that are already installed
        #[arg(short, long)]
        force: bool,

        /// Keep the bundled source tree when the archive has one
        #[arg(short = 's', long)]
        include_source: bool,

        /// Version specifiers, prefixes select the highest match
        versions: Vec<String>,
    },

    /// Update installed versions to a newer release
    #[command(alias = "upgrade")]
    Update {
        /// Release to update to, defaults to the latest
        #[arg(short, long)]
        release: Option<ReleaseId>,

        /// Update every installed version
        #[arg(short, long)]
        all: bool,

        /// Version to leave out of an --all update
        #[arg(long, value_name = "VERSION")]
        skip: Vec<String>,

        /// Keep the outgoing version installed next to its successor
        #[arg(short, long)]
        keep: bool,

        /// Installed versions to update, prefixes allowed
        versions: Vec<String>,
    },

    /// Remove installed versions
    #[command(alias = "uninstall")]
    Remove {
        /// Remove every installed version
        #[arg(short, long)]
        all: bool,

        /// Version to leave out of an --all remove
        #[arg(long, value_name = "VERSION")]
        skip: Vec<String>,

        /// Only remove versions installed from this release
        #[arg(short, long)]
        release: Option<ReleaseId>,

        /// Installed versions to remove, prefixes allowed
        versions: Vec<String>,
    },

    /// List installed versions and their update status
    List {
        /// Explain why a version is not updatable
        #[arg(short, long)]
        verbose: bool,

        /// Release to check for updates, defaults to the latest
        #[arg(short, long)]
        release: Option<ReleaseId>,

        /// Installed versions to list, prefixes allowed
        versions: Vec<String>,
    },

    /// Show the versions a release provides, or the releases themselves
    Show {
        /// Show recent and cached releases instead of versions
        #[arg(short, long, conflicts_with_all = ["release", "all"])]
        list: bool,

        /// Release to show, defaults to the latest
        #[arg(short, long)]
        release: Option<ReleaseId>,

        /// Show every distribution, not just the selected one
        #[arg(short, long)]
        all: bool,

        /// Only show entries matching this regular expression
        #[arg(value_name = "REGEX")]
        matching: Option<String>,
    },

    /// Print the installation directory of a version
    Path {
        /// Print the path of the python executable instead
        #[arg(short, long)]
        python_path: bool,

        /// Resolve symlinks to the full version directory
        #[arg(short, long)]
        resolve: bool,

        /// Print the download cache directory instead
        #[arg(short, long, conflicts_with = "version")]
        cache_path: bool,

        /// Installed version, symlink names like 3.12 work too
        version: Option<String>,
    },

    /// Show or prune the download cache
    Cache {
        /// Leave out the total size line
        #[arg(short = 'T', long)]
        no_total: bool,

        /// Print sizes in bytes
        #[arg(short = 'H', long)]
        no_human_readable: bool,

        /// Remove the cache of the given releases, or all downloads
        #[arg(short, long)]
        remove: bool,

        /// Remove every cached release no installed version uses
        #[arg(short = 'R', long, conflicts_with_all = ["remove", "releases"])]
        remove_all_unused: bool,

        /// Releases to show or remove, defaults to every cached one
        releases: Vec<ReleaseId>,
    },

    /// Run uv with an installed python version
    Uv {
        /// Version to run with, defaults to the highest installed major
        #[arg(short, long)]
        python: Option<String>,

        /// Arguments passed through to uv
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run uvx with an installed python version
    Uvx {
        /// Version to run with, defaults to the highest installed major
        #[arg(short, long)]
        python: Option<String>,

        /// Arguments passed through to uvx
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let home = pyvm::try_pyvm_home().context("Could not determine home directory")?;
    let dirs = Dirs::new(&home);
    dirs.ensure()?;

    let _lock = RunLock::acquire(&[dirs.versions.join(".lock"), dirs.cache.join(".lock")])
        .map_err(|e| match e {
            LockError::Contended => anyhow!("Another instance of pyvm is already running."),
            LockError::Io(e) => anyhow!(e),
        })?;

    let distribution = match cli.distribution {
        Some(name) => Distribution::from(name),
        None => match Distribution::host() {
            Some(distribution) => distribution,
            None => bail!(
                "No default distribution for {}/{}; use --distribution.",
                consts::OS,
                consts::ARCH
            ),
        },
    };

    let registry = Registry::new(cli.github_access_token.as_deref())?;
    let settings = Settings {
        distribution,
        cache_minutes: cli.cache_minutes,
        purge_days: cli.purge_days,
        no_strip: cli.no_strip,
    };
    let ctx = Context::new(registry, dirs, settings);

    let result = run(cli.command, &ctx).await;

    // Maintenance runs whether the command succeeded or not.
    if let Err(e) = maintain(&ctx) {
        match &result {
            Ok(_) => return Err(e.into()),
            Err(_) => tracing::warn!("maintenance failed: {e}"),
        }
    }

    let code = result?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

async fn run(command: Commands, ctx: &Context) -> Result<i32> {
    match command {
        Commands::Install {
            release,
            all,
            all_prerelease,
            skip,
            force,
            include_source,
            versions,
        } => {
            cmd::install::install(
                ctx,
                release.as_ref(),
                all,
                all_prerelease,
                &skip,
                force,
                include_source,
                &versions,
            )
            .await?;
        }
        Commands::Update {
            release,
            all,
            skip,
            keep,
            versions,
        } => {
            cmd::update::update(ctx, release.as_ref(), all, &skip, keep, &versions).await?;
        }
        Commands::Remove {
            all,
            skip,
            release,
            versions,
        } => {
            cmd::remove::remove(ctx, all, &skip, release.as_ref(), &versions)?;
        }
        Commands::List {
            verbose,
            release,
            versions,
        } => {
            cmd::list::list(ctx, verbose, release.as_ref(), &versions).await?;
        }
        Commands::Show {
            list,
            release,
            all,
            matching,
        } => {
            cmd::show::show(ctx, list, release.as_ref(), all, matching.as_deref()).await?;
        }
        Commands::Path {
            python_path,
            resolve,
            cache_path,
            version,
        } => {
            cmd::path::path(ctx, python_path, resolve, cache_path, version.as_deref())?;
        }
        Commands::Cache {
            no_total,
            no_human_readable,
            remove,
            remove_all_unused,
            releases,
        } => {
            cmd::cache::cache(
                ctx,
                no_total,
                no_human_readable,
                remove,
                remove_all_unused,
                &releases,
            )?;
        }
        Commands::Uv { python, args } => {
            return cmd::uv::uv(ctx, python.as_deref(), &args, "uv");
        }
        Commands::Uvx { python, args } => {
            return cmd::uv::uv(ctx, python.as_deref(), &args, "uvx");
        }
    }

    Ok(0)
}

/// Drop stale release caches and refresh the version symlinks.
fn maintain(ctx: &Context) -> std::io::Result<()> {
    ops::retention::purge_unused(&ctx.dirs, ctx.settings.purge_days)?;
    ops::symlinks::update_version_symlinks(&ctx.dirs.versions)
}
