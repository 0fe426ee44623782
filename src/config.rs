//! # Configuration Management
//!
//! Centralized configuration for the game network core.
//!
//! This module provides structured configuration for the server lifecycle
//! manager, including thread-pool sizing, listener parameters, and logging.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-specific overrides
//!
//! ## Required Keys
//! The four lifecycle values under `[server]` — `accept_threads`,
//! `worker_threads`, `port`, and `backlog` — are required. A TOML document
//! that omits or mistypes any of them fails to parse, which surfaces as a
//! fatal `ConfigError` during `NetServer::start()`.

use crate::error::{ProtocolError, Result};
use crate::utils::timeout;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// Max allowed frame size on the wire, tag included (16 MB)
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Protocol version string advertised in ping packets
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Main network configuration structure that contains all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct NetworkConfig {
    /// Server lifecycle configuration (required section)
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl NetworkConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(threads) = std::env::var("GAMENET_ACCEPT_THREADS") {
            config.server.accept_threads = threads
                .parse::<usize>()
                .map_err(|e| ProtocolError::ConfigError(format!("GAMENET_ACCEPT_THREADS: {e}")))?;
        }

        if let Ok(threads) = std::env::var("GAMENET_WORKER_THREADS") {
            config.server.worker_threads = threads
                .parse::<usize>()
                .map_err(|e| ProtocolError::ConfigError(format!("GAMENET_WORKER_THREADS: {e}")))?;
        }

        if let Ok(port) = std::env::var("GAMENET_PORT") {
            config.server.port = port
                .parse::<u16>()
                .map_err(|e| ProtocolError::ConfigError(format!("GAMENET_PORT: {e}")))?;
        }

        if let Ok(backlog) = std::env::var("GAMENET_BACKLOG") {
            config.server.backlog = backlog
                .parse::<u32>()
                .map_err(|e| ProtocolError::ConfigError(format!("GAMENET_BACKLOG: {e}")))?;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        errors.extend(self.server.validate());
        errors.extend(self.logging.validate());

        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Server lifecycle configuration
///
/// The four lifecycle keys have no serde defaults: a TOML document must
/// spell out each one explicitly.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Number of threads in the accept pool
    pub accept_threads: usize,

    /// Number of threads in the worker pool
    pub worker_threads: usize,

    /// Listen port (1-65535)
    pub port: u16,

    /// Accept backlog for the listening socket
    pub backlog: u32,

    /// Interface to bind (defaults to all interfaces)
    #[serde(default = "default_host")]
    pub host: String,

    /// Timeout for graceful pool shutdown
    #[serde(default = "default_shutdown_timeout", with = "duration_serde")]
    pub shutdown_timeout: Duration,
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

fn default_shutdown_timeout() -> Duration {
    timeout::SHUTDOWN_TIMEOUT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            accept_threads: 1,
            worker_threads: 4,
            port: 25000,
            backlog: 128,
            host: default_host(),
            shutdown_timeout: timeout::SHUTDOWN_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Validate server configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.accept_threads == 0 {
            errors.push("Accept thread count must be greater than 0".to_string());
        } else if self.accept_threads > 32 {
            errors.push(format!(
                "Accept thread count very high: {} (one or two is typical)",
                self.accept_threads
            ));
        }

        if self.worker_threads == 0 {
            errors.push("Worker thread count must be greater than 0".to_string());
        } else if self.worker_threads > 1024 {
            errors.push(format!(
                "Worker thread count too large: {} (max recommended: 1024)",
                self.worker_threads
            ));
        }

        if self.port == 0 {
            errors.push("Listen port must be in range 1-65535".to_string());
        }

        if self.backlog == 0 {
            errors.push("Accept backlog must be greater than 0".to_string());
        }

        if self.host.is_empty() {
            errors.push("Bind host cannot be empty".to_string());
        } else if format!("{}:{}", self.host, self.port)
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            errors.push(format!(
                "Invalid bind host: '{}' (expected an IP address such as '0.0.0.0')",
                self.host
            ));
        }

        if self.shutdown_timeout.as_secs() < 1 {
            errors.push("Shutdown timeout too short (minimum: 1s)".to_string());
        } else if self.shutdown_timeout.as_secs() > 60 {
            errors.push("Shutdown timeout too long (maximum: 60s)".to_string());
        }

        errors
    }

    /// Socket address the listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to log to console
    pub log_to_console: bool,

    /// Path to a log file, if file output is wanted
    pub log_file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("gamenet-protocol"),
            log_level: Level::INFO,
            log_to_console: true,
            log_file_path: None,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        if let Some(ref path) = self.log_file_path {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    errors.push(format!(
                        "Log file directory does not exist: {}",
                        parent.display()
                    ));
                }
            }
        }

        if !self.log_to_console && self.log_file_path.is_none() {
            errors
                .push("At least one logging output (console or file) must be enabled".to_string());
        }

        errors
    }
}

/// Helper module for Duration serialization/deserialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = duration.as_millis() as u64;
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
