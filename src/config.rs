//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory holding one subdirectory per served domain
    pub content_dir: PathBuf,
    /// Address the HTTP listener binds to
    pub server_host: String,
    /// HTTP server port
    pub server_port: u16,
    /// Whether the cache key includes the request's domain
    pub host_scoped_cache: bool,
    /// Seconds between cache statistics log lines, 0 disables reporting
    pub stats_interval: u64,
    /// Seconds a request may take before it is answered with 408, 0 disables
    pub request_timeout: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CONTENT_DIR` - Content base directory (default: ./www)
    /// - `SERVER_HOST` - Bind address (default: 0.0.0.0)
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `HOST_SCOPED_CACHE` - Include the domain in cache keys (default: true)
    /// - `STATS_INTERVAL` - Statistics log frequency in seconds (default: 60)
    /// - `REQUEST_TIMEOUT` - Per-request time limit in seconds (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            content_dir: env::var("CONTENT_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.content_dir),
            server_host: env::var("SERVER_HOST")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.server_host),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            host_scoped_cache: env::var("HOST_SCOPED_CACHE")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.host_scoped_cache),
            stats_interval: env::var("STATS_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.stats_interval),
            request_timeout: env::var("REQUEST_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("./www"),
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            host_scoped_cache: true,
            stats_interval: 60,
            request_timeout: 10,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
