//! Release tags for upstream build batches.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Rejection reasons for a malformed release tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReleaseIdError {
    /// Not an 8-digit string.
    #[error("Release must be a YYYYMMDD string.")]
    Malformed,
    /// Eight digits that do not form a calendar date.
    #[error("Release must be a YYYYMMDD date string.")]
    NotADate,
}

/// An upstream release tag in `YYYYMMDD` form, e.g. `20240415`.
///
/// Tags are validated calendar dates, so their lexicographic order is
/// also their chronological order.
///
/// ```
/// use pyvm::types::ReleaseId;
///
/// let tag: ReleaseId = "20240415".parse().unwrap();
/// assert_eq!(tag.as_str(), "20240415");
/// assert!("20241301".parse::<ReleaseId>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReleaseId(String);

impl ReleaseId {
    /// Validate and wrap a tag string.
    pub fn parse(s: &str) -> Result<Self, ReleaseIdError> {
        if s.len() != 8 || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(ReleaseIdError::Malformed);
        }
        if NaiveDate::parse_from_str(s, "%Y%m%d").is_err() {
            return Err(ReleaseIdError::NotADate);
        }
        Ok(Self(s.to_string()))
    }

    /// Get the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ReleaseId {
    type Err = ReleaseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ReleaseId {
    type Error = ReleaseIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ReleaseId> for String {
    fn from(tag: ReleaseId) -> Self {
        tag.0
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ReleaseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<Path> for ReleaseId {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl PartialEq<str> for ReleaseId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ReleaseId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
