//! File cache error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by [`super::FileHandleCache`]
#[derive(Debug, Error)]
pub enum CacheError {
    /// Path does not resolve to a regular file
    #[error("not a regular file: {}", path.display())]
    NotFound { path: PathBuf },

    /// Opening or inspecting an existing file failed
    #[error("failed to open '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Capacity must be at least 1
    #[error("invalid open file cache capacity {0}, must be >= 1")]
    InvalidCapacity(usize),
}

impl CacheError {
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
