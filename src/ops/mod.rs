pub mod context;
pub mod error;
pub mod flow;
pub mod install;
pub mod remove;
pub mod resolve;
pub mod retention;
pub mod symlinks;

pub use context::{Context, Dirs, Settings};
pub use error::InstallError;
