//! Core modules - pure, stateless logic

pub mod catalog;
pub mod matcher;

pub use catalog::ReleaseCatalog;
pub use matcher::VersionMatcher;
