// Configuration module entry point
// Loads the layered server configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{
    Config, HttpConfig, LoggingConfig, OpenFileCacheConfig, PerformanceConfig,
};

/// Config file used when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "server.conf";

impl Config {
    /// Load configuration from a JSON file, environment and defaults
    ///
    /// A missing file is not an error, defaults apply. Environment variables
    /// use the `SERVER_` prefix and `__` between nested keys, e.g.
    /// `SERVER_PORT=9000` or `SERVER_OPEN_FILE_CACHE__MAX_SIZE=16`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(
                config::File::new(config_path, config::FileFormat::Json).required(false),
            )
            .add_source(
                config::Environment::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("static_dir", "static")?
            .set_default("index_file", "index.html")?
            .set_default("open_file_cache.enabled", true)?
            .set_default("open_file_cache.max_size", 100)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_timeout", 10)?
            .set_default("http.server_name", "cached-httpd")?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values that can only be caught after deserialization
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.open_file_cache.max_size == 0 {
            return Err(config::ConfigError::Message(
                "open_file_cache.max_size must be a positive integer".to_string(),
            ));
        }
        if self.workers == Some(0) {
            return Err(config::ConfigError::Message(
                "workers must be >= 1".to_string(),
            ));
        }
        self.get_socket_addr()
            .map_err(config::ConfigError::Message)?;
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nonexistent.conf");

        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.static_dir, "static");
        assert!(cfg.open_file_cache.enabled);
        assert_eq!(cfg.open_file_cache.max_size, 100);
        assert_eq!(cfg.template_dir(), std::path::PathBuf::from("static/templates"));
    }

    #[test]
    fn test_loads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.conf");
        fs::write(
            &path,
            r#"{
                "host": "0.0.0.0",
                "port": 8000,
                "static_dir": "/srv/www",
                "open_file_cache": {"enabled": false, "max_size": 50},
                "logging": {"access_log_format": "json"}
            }"#,
        )
        .unwrap();

        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8000);
        assert!(!cfg.open_file_cache.enabled);
        assert_eq!(cfg.open_file_cache.max_size, 50);
        assert_eq!(cfg.logging.access_log_format, "json");
        // untouched keys in a partially given section keep their defaults
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.template_dir(), std::path::PathBuf::from("/srv/www/templates"));
    }

    #[test]
    fn test_zero_cache_size_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.conf");
        fs::write(&path, r#"{"open_file_cache": {"max_size": 0}}"#).unwrap();

        let err = Config::load_from(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("max_size"));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.conf");
        fs::write(&path, r#"{"workers": 0}"#).unwrap();

        let err = Config::load_from(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("workers"));

        fs::write(&path, r#"{"workers": 2}"#).unwrap();
        assert_eq!(Config::load_from(path.to_str().unwrap()).unwrap().workers, Some(2));
    }

    #[test]
    fn test_invalid_host_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.conf");
        fs::write(&path, r#"{"host": "not a host"}"#).unwrap();

        assert!(Config::load_from(path.to_str().unwrap()).is_err());
    }
}
