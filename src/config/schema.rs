//! Configuration schema types
//!
//! This module defines the configuration structure for mlmigrate. Every
//! section is optional in the TOML file; defaults apply for anything left out.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

/// Main mlmigrate configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MigrateConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Source tracking server
    #[serde(default)]
    pub source: EndpointSettings,

    /// Destination tracking server (copy operations)
    #[serde(default)]
    pub destination: EndpointSettings,

    /// Experiment export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Model version copy settings
    #[serde(default)]
    pub copy: CopyConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MigrateConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.source.validate("source")?;
        self.destination.validate("destination")?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Endpoint settings as written in the config file
///
/// Host and token are optional here; anything missing is filled in from the
/// process environment when the endpoint is resolved at the CLI boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointSettings {
    /// Server base URL, e.g. `https://my-workspace.cloud.databricks.com`
    #[serde(default)]
    pub host: Option<String>,

    /// Bearer token
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub token: Option<SecretString>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl EndpointSettings {
    fn validate(&self, section: &str) -> Result<(), String> {
        if let Some(host) = &self.host {
            validate_host(host).map_err(|e| format!("{section}.host: {e}"))?;
        }

        if self.timeout_seconds == 0 || self.timeout_seconds > 300 {
            return Err(format!(
                "{section}.timeout_seconds must be between 1 and 300, got {}",
                self.timeout_seconds
            ));
        }

        Ok(())
    }
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            host: None,
            token: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Fully resolved endpoint used to construct a transport client
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Server base URL without trailing slash
    pub host: String,

    /// Bearer token, if the server requires one
    pub token: Option<SecretString>,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

impl EndpointConfig {
    /// Create an endpoint with the default timeout
    pub fn new(host: impl Into<String>, token: Option<SecretString>) -> Self {
        Self {
            host: host.into().trim_end_matches('/').to_string(),
            token,
            timeout_seconds: default_timeout_seconds(),
        }
    }

    /// Override the request timeout
    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// Experiment export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output directory for manifests
    #[serde(default)]
    pub output_dir: Option<String>,

    /// Export runs on a bounded worker pool instead of one at a time
    #[serde(default)]
    pub use_threads: bool,

    /// Worker pool size when `use_threads` is set
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Include soft-deleted runs
    #[serde(default)]
    pub export_deleted_runs: bool,

    /// Only export runs started at or after this UTC time
    /// (`YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or RFC 3339)
    #[serde(default)]
    pub run_start_time: Option<String>,

    /// Page size for run searches
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_workers == 0 || self.max_workers > 64 {
            return Err(format!(
                "export.max_workers must be between 1 and 64, got {}",
                self.max_workers
            ));
        }

        if self.page_size == 0 || self.page_size > 50_000 {
            return Err(format!(
                "export.page_size must be between 1 and 50000, got {}",
                self.page_size
            ));
        }

        if let Some(start) = &self.run_start_time {
            crate::core::timestamp::parse_utc_millis(start)
                .map_err(|e| format!("export.run_start_time: {e}"))?;
        }

        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            use_threads: false,
            max_workers: default_max_workers(),
            export_deleted_runs: false,
            run_start_time: None,
            page_size: default_page_size(),
        }
    }
}

/// Model version copy configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CopyConfig {
    /// Add provenance tags to copied model versions
    #[serde(default)]
    pub copy_lineage_tags: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

/// Check that a host is an absolute http(s) URL
pub fn validate_host(host: &str) -> Result<(), String> {
    let url = Url::parse(host).map_err(|e| format!("invalid URL '{host}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!(
            "unsupported scheme '{other}' in '{host}', must be http or https"
        )),
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_seconds() -> u64 {
    15
}

fn default_max_workers() -> usize {
    4
}

fn default_page_size() -> usize {
    1000
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
