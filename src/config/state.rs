// Application state module
// Shared state handed to every connection task

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use super::types::Config;
use crate::cache::{CacheError, FileHandleCache};
use crate::logger;

/// Application state
pub struct AppState {
    pub config: Config,

    /// `None` when `open_file_cache.enabled` is false
    pub file_cache: Option<FileHandleCache>,

    pub static_dir: PathBuf,
    pub template_dir: PathBuf,

    // Cached config values for fast access without locks
    pub cached_access_log: AtomicBool,
}

impl AppState {
    /// Build the state, creating the file cache when enabled
    ///
    /// Fails with [`CacheError::InvalidCapacity`] for a zero cache size.
    pub fn new(config: Config) -> Result<Self, CacheError> {
        let file_cache = if config.open_file_cache.enabled {
            Some(FileHandleCache::new(config.open_file_cache.max_size)?)
        } else {
            None
        };

        Ok(Self {
            static_dir: PathBuf::from(&config.static_dir),
            template_dir: config.template_dir(),
            cached_access_log: AtomicBool::new(config.logging.access_log),
            file_cache,
            config,
        })
    }

    pub fn access_log_enabled(&self) -> bool {
        self.cached_access_log.load(Ordering::Relaxed)
    }

    /// Close every cached handle, logging what was released
    ///
    /// Called once by the server after connections have drained.
    pub fn close_file_cache(&self) -> usize {
        let Some(cache) = &self.file_cache else {
            return 0;
        };
        let stats = cache.stats();
        let closed = cache.close_all();
        logger::log_cache_closed(closed, &stats);
        closed
    }
}
