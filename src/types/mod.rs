pub mod distribution;
pub mod release;
pub mod version;

pub use distribution::Distribution;
pub use release::{ReleaseId, ReleaseIdError};
pub use version::Version;
