//! Logger module
//!
//! Provides logging utilities for the HTTP server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging
//! - Open file cache activity (debug level)
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::Level;

use crate::cache::CacheStats;
use crate::config::Config;
use std::net::SocketAddr;
use std::path::Path;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        Level::parse(&config.logging.level),
    )
}

fn enabled(level: Level) -> bool {
    let current = writer::get().map_or(Level::Info, writer::LogWriter::level);
    level <= current
}

/// Write to info/access log
fn write_info(message: &str) {
    if !enabled(Level::Info) {
        return;
    }
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

fn write_debug(message: &str) {
    if enabled(Level::Debug) {
        write_info(message);
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Async server started successfully");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Static directory: {}", config.static_dir));
    write_info(&format!("Template directory: {}", config.template_dir().display()));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if config.open_file_cache.enabled {
        write_info(&format!(
            "Open file cache: enabled (max {} handles)",
            config.open_file_cache.max_size
        ));
    } else {
        write_info("Open file cache: disabled");
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    if enabled(Level::Error) {
        write_error(&format!("[ERROR] {message}"));
    }
}

pub fn log_warning(message: &str) {
    if enabled(Level::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    match writer::get() {
        Some(w) => w.write_access(&line),
        None => println!("{line}"),
    }
}

pub fn log_cache_hit(path: &Path) {
    write_debug(&format!("[Cache] hit {}", path.display()));
}

pub fn log_cache_open(path: &Path, len: usize, capacity: usize) {
    write_debug(&format!(
        "[Cache] opened {} ({len}/{capacity} resident)",
        path.display()
    ));
}

pub fn log_cache_eviction(path: &Path) {
    write_debug(&format!("[Cache] evicted {}", path.display()));
}

pub fn log_cache_closed(closed: usize, stats: &CacheStats) {
    write_info(&format!(
        "[SHUTDOWN] Closed {closed} cached file handles (hits: {}, misses: {}, evictions: {})",
        stats.hits, stats.misses, stats.evictions
    ));
}

pub fn log_signal(name: &str) {
    write_info(&format!("\n[SIGNAL] {name} received, initiating graceful shutdown"));
}

pub fn log_shutdown_started(active: usize) {
    write_info(&format!(
        "[SHUTDOWN] Listener closed, waiting for {active} active connection(s)"
    ));
}

pub fn log_shutdown_timeout(remaining: usize) {
    log_warning(&format!(
        "[SHUTDOWN] Drain timeout elapsed with {remaining} connection(s) still active"
    ));
}

pub fn log_shutdown_complete() {
    write_info("[SHUTDOWN] Server stopped");
}
