//! Open file handle cache
//!
//! Bounded mapping from path to an open read-only handle, evicting the
//! least-recently-used entry when full.
//!
//! ## Ordering
//!
//! Uses `IndexMap` as the recency list: index 0 is the eviction candidate,
//! the last index is the most recently used entry. A hit moves the entry to
//! the back, an eviction removes the front.
//!
//! ## Locking
//!
//! The whole check-open-evict-insert sequence runs under one mutex, so
//! concurrent `get` calls can neither overflow the capacity nor close the
//! same handle twice. No `.await` is ever held across the lock.
//!
//! ## Staleness
//!
//! Size and modification time are captured once, on the miss that opens the
//! file, and never compared against the live file again. A rewritten file
//! keeps its old snapshot until the entry is evicted.
//!
//! ## Keys
//!
//! Paths are used as given. Callers canonicalize first so that a symlink and
//! its target map to one entry.

mod entry;
mod error;

pub use entry::CacheEntry;
pub use error::CacheError;

use indexmap::IndexMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::logger;

/// Counters snapshot, see [`FileHandleCache::stats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub len: usize,
    pub capacity: usize,
}

/// LRU cache of open file handles
pub struct FileHandleCache {
    capacity: usize,
    entries: Mutex<IndexMap<PathBuf, Arc<CacheEntry>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl FileHandleCache {
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity(capacity));
        }

        Ok(Self {
            capacity,
            entries: Mutex::new(IndexMap::with_capacity(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        })
    }

    /// Get the cached handle for `path`, opening it on a miss
    ///
    /// Fails with [`CacheError::NotFound`] when `path` is not a regular file
    /// and with [`CacheError::Io`] when opening it fails. Neither failure
    /// touches the mapping: the file is opened before anything is evicted.
    pub fn get(&self, path: &Path) -> Result<Arc<CacheEntry>, CacheError> {
        let mut entries = self.lock();

        // fs::metadata follows symlinks, so a dangling link is NotFound too
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => {}
            _ => {
                return Err(CacheError::NotFound {
                    path: path.to_path_buf(),
                })
            }
        }

        if let Some(index) = entries.get_index_of(path) {
            let last = entries.len() - 1;
            entries.move_index(index, last);
            self.hits.fetch_add(1, Ordering::Relaxed);
            logger::log_cache_hit(path);
            if let Some((_, entry)) = entries.get_index(last) {
                return Ok(Arc::clone(entry));
            }
        }

        let entry = Arc::new(open_entry(path)?);
        self.misses.fetch_add(1, Ordering::Relaxed);

        if entries.len() >= self.capacity {
            if let Some((evicted_path, evicted)) = entries.shift_remove_index(0) {
                evicted.close();
                self.evictions.fetch_add(1, Ordering::Relaxed);
                logger::log_cache_eviction(&evicted_path);
            }
        }

        entries.insert(path.to_path_buf(), Arc::clone(&entry));
        logger::log_cache_open(path, entries.len(), self.capacity);
        Ok(entry)
    }

    /// Close every resident handle and empty the cache
    ///
    /// Returns the number of handles closed. Calling it again is a no-op, and
    /// the cache can be used afterwards as if freshly created.
    pub fn close_all(&self) -> usize {
        let mut entries = self.lock();
        let mut closed = 0;
        for (_, entry) in entries.drain(..) {
            if entry.close() {
                closed += 1;
            }
        }
        closed
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            len: self.len(),
            capacity: self.capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<PathBuf, Arc<CacheEntry>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for FileHandleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileHandleCache")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Open `path` and snapshot its metadata from the open handle
fn open_entry(path: &Path) -> Result<CacheEntry, CacheError> {
    let io_err = |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let meta = file.metadata().map_err(io_err)?;
    let last_modified = meta.modified().map_err(io_err)?;

    Ok(CacheEntry::new(
        path.to_path_buf(),
        file,
        meta.len(),
        last_modified,
    ))
}
