//! Configuration management for mlmigrate.
//!
//! TOML configuration with `${VAR_NAME}` substitution, `MLMIGRATE_*`
//! environment overrides and validation on load. The file is optional: the
//! CLI starts from defaults when it is missing.
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [source]
//! host = "https://dev-workspace.cloud.databricks.com"
//! token = "${DEV_DATABRICKS_TOKEN}"
//!
//! [destination]
//! host = "https://prod-workspace.cloud.databricks.com"
//! token = "${PROD_DATABRICKS_TOKEN}"
//! timeout_seconds = 15
//!
//! [export]
//! output_dir = "out"
//! use_threads = true
//! max_workers = 4
//!
//! [copy]
//! copy_lineage_tags = true
//! ```
//!
//! Endpoints left unset here are resolved from the environment at the
//! process boundary (see [`crate::adapters::tracking::credentials`]).

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default};
pub use schema::{
    ApplicationConfig, CopyConfig, EndpointConfig, EndpointSettings, ExportConfig, LoggingConfig,
    MigrateConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
