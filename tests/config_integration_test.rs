//! Integration tests for configuration loading and endpoint resolution
//!
//! Note: Tests that modify environment variables hold ENV_MUTEX so they do
//! not interfere with each other.

use mlmigrate::adapters::tracking::{resolve_endpoint, EndpointRole};
use mlmigrate::config::{load_config, load_config_or_default};
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ENDPOINT_VARS: [&str; 10] = [
    "MLFLOW_TRACKING_URI",
    "MLFLOW_TRACKING_TOKEN",
    "DATABRICKS_HOST",
    "DATABRICKS_TOKEN",
    "MLFLOW_TRACKING_URI_DST",
    "MLFLOW_TRACKING_TOKEN_DST",
    "DATABRICKS_HOST_DST",
    "DATABRICKS_TOKEN_DST",
    "MLMIGRATE_SOURCE_HOST",
    "MLMIGRATE_EXPORT_MAX_WORKERS",
];

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    for var in ENDPOINT_VARS {
        std::env::remove_var(var);
    }
    std::env::remove_var("TEST_MLMIGRATE_SRC_TOKEN");
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let temp_file = write_config(
        r#"
[application]
log_level = "debug"

[source]
host = "http://localhost:5000/"
token = "src-token"
timeout_seconds = 30

[destination]
host = "https://dst.cloud.databricks.com"

[export]
output_dir = "/tmp/mlmigrate-out"
use_threads = true
max_workers = 8
export_deleted_runs = true
run_start_time = "2024-01-15 08:30:00"
page_size = 200

[copy]
copy_lineage_tags = true

[logging]
local_enabled = true
local_path = "/tmp/mlmigrate-logs"
local_rotation = "hourly"
"#,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.source.timeout_seconds, 30);
    assert_eq!(config.export.output_dir.as_deref(), Some("/tmp/mlmigrate-out"));
    assert!(config.export.use_threads);
    assert_eq!(config.export.max_workers, 8);
    assert!(config.export.export_deleted_runs);
    assert_eq!(config.export.page_size, 200);
    assert!(config.copy.copy_lineage_tags);
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");

    let src = resolve_endpoint(EndpointRole::Source, &config.source).unwrap();
    assert_eq!(src.host, "http://localhost:5000");
    assert_eq!(src.timeout_seconds, 30);
    assert_eq!(
        src.token.as_ref().map(|t| t.expose_secret().to_string()),
        Some("src-token".to_string())
    );
}

#[test]
fn test_missing_file_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let config = load_config_or_default("definitely-not-here.toml").unwrap();
    assert_eq!(config.application.log_level, "info");
    assert_eq!(config.source.timeout_seconds, 15);
    assert!(!config.export.use_threads);
    assert_eq!(config.export.max_workers, 4);
    assert!(config.export.output_dir.is_none());
}

#[test]
fn test_env_var_substitution_and_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_MLMIGRATE_SRC_TOKEN", "substituted");
    std::env::set_var("MLMIGRATE_SOURCE_HOST", "https://override.example.com");
    std::env::set_var("MLMIGRATE_EXPORT_MAX_WORKERS", "16");

    let temp_file = write_config(
        r#"
[source]
host = "http://localhost:5000"
token = "${TEST_MLMIGRATE_SRC_TOKEN}"
"#,
    );

    let config = load_config(temp_file.path()).unwrap();
    cleanup_env_vars();

    assert_eq!(
        config.source.host.as_deref(),
        Some("https://override.example.com")
    );
    assert_eq!(
        config
            .source
            .token
            .as_ref()
            .map(|t| t.expose_secret().to_string()),
        Some("substituted".to_string())
    );
    assert_eq!(config.export.max_workers, 16);
}

#[test]
fn test_invalid_config_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let temp_file = write_config(
        r#"
[source]
host = "databricks"
"#,
    );
    let err = load_config(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("source.host"));

    let temp_file = write_config("[export]\nrun_start_time = \"yesterday\"\n");
    assert!(load_config(temp_file.path()).is_err());
}

#[test]
fn test_destination_resolves_from_suffixed_environment() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("MLFLOW_TRACKING_URI", "databricks");
    std::env::set_var("DATABRICKS_HOST", "https://src.cloud.databricks.com");
    std::env::set_var("DATABRICKS_TOKEN", "src-token");
    std::env::set_var("DATABRICKS_HOST_DST", "https://dst.cloud.databricks.com");

    let config = load_config_or_default("definitely-not-here.toml").unwrap();
    let src = resolve_endpoint(EndpointRole::Source, &config.source);
    let dst = resolve_endpoint(EndpointRole::Destination, &config.destination);
    cleanup_env_vars();

    let src = src.unwrap();
    let dst = dst.unwrap();
    assert_eq!(src.host, "https://src.cloud.databricks.com");
    assert_eq!(dst.host, "https://dst.cloud.databricks.com");
    // No _DST token, so the destination falls back to the source variable
    assert_eq!(
        dst.token.as_ref().map(|t| t.expose_secret().to_string()),
        Some("src-token".to_string())
    );
}

#[test]
fn test_unresolvable_endpoint_is_auth_configuration_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let config = load_config_or_default("definitely-not-here.toml").unwrap();
    let err = resolve_endpoint(EndpointRole::Source, &config.source).unwrap_err();
    assert!(matches!(
        err,
        mlmigrate::domain::MigrateError::AuthConfiguration(_)
    ));
}
