// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
///
/// Server-level keys sit at the top of the JSON document, the remaining
/// concerns are grouped in sections.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
    pub static_dir: String,
    pub index_file: String,
    /// Defaults to `<static_dir>/templates`
    #[serde(default)]
    pub template_dir: Option<String>,
    pub open_file_cache: OpenFileCacheConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

impl Config {
    pub fn template_dir(&self) -> PathBuf {
        self.template_dir.as_ref().map_or_else(
            || PathBuf::from(&self.static_dir).join("templates"),
            PathBuf::from,
        )
    }
}

/// Open file handle cache configuration
#[derive(Debug, Deserialize, Clone)]
pub struct OpenFileCacheConfig {
    pub enabled: bool,
    /// Maximum number of simultaneously cached handles, must be >= 1
    pub max_size: usize,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Performance configuration (all durations in seconds)
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub read_timeout: u64,
    pub write_timeout: u64,
    #[serde(default)]
    pub max_connections: Option<u64>,
    /// How long shutdown waits for in-flight connections
    pub shutdown_timeout: u64,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
}
