//! Remote release registry logic
pub mod github;

pub use github::Registry;
