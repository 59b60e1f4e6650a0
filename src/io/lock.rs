//! Single-instance guard built on advisory file locks.

use std::fs::{File, OpenOptions};
use std::path::PathBuf;

use fs4::fs_std::FileExt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LockError {
    #[error("another instance is already running")]
    Contended,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Exclusive locks held for the lifetime of the process.
///
/// Dropping the guard releases every lock.
#[derive(Debug)]
pub struct RunLock {
    _files: Vec<File>,
}

impl RunLock {
    /// Lock every path in `paths`, failing fast when any is held elsewhere.
    pub fn acquire(paths: &[PathBuf]) -> Result<Self, LockError> {
        let mut files = Vec::with_capacity(paths.len());

        for path in paths {
            let file = OpenOptions::new().create(true).write(true).open(path)?;
            if !file.try_lock_exclusive()? {
                return Err(LockError::Contended);
            }
            files.push(file);
        }

        Ok(Self { _files: files })
    }
}
