//! Cached file entry
//!
//! An entry owns one open read-only handle. Only the cache closes it, either
//! on eviction or in `close_all`.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

/// Open file handle plus the metadata captured when it was opened
#[derive(Debug)]
pub struct CacheEntry {
    path: PathBuf,
    handle: Mutex<Option<File>>,
    size: u64,
    last_modified: SystemTime,
}

impl CacheEntry {
    pub(crate) fn new(path: PathBuf, file: File, size: u64, last_modified: SystemTime) -> Self {
        Self {
            path,
            handle: Mutex::new(Some(file)),
            size,
            last_modified,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte length at open time. Never refreshed.
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Modification time at open time. Never refreshed.
    pub const fn last_modified(&self) -> SystemTime {
        self.last_modified
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Rewind the shared handle and read the whole file
    ///
    /// The handle is reused across requests, so the read always starts from
    /// offset 0. Fails with an I/O error if the entry was already closed.
    pub fn read_all(&self) -> io::Result<Vec<u8>> {
        let mut handle = self.lock();
        let file = handle.as_mut().ok_or_else(|| {
            io::Error::other(format!(
                "cached handle for '{}' is closed",
                self.path().display()
            ))
        })?;

        file.seek(SeekFrom::Start(0))?;
        let mut buf = Vec::with_capacity(usize::try_from(self.size).unwrap_or(0));
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Drop the handle, closing the descriptor. Returns false if already closed.
    pub(crate) fn close(&self) -> bool {
        self.lock().take().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<File>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
