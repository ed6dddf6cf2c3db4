//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::MigrateConfig;
use super::secret::secret_string;
use crate::domain::errors::MigrateError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into MigrateConfig
/// 4. Applies environment variable overrides (MLMIGRATE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file is missing or unreadable, if TOML parsing or
/// variable substitution fails, or if validation fails.
///
/// # Examples
///
/// ```no_run
/// use mlmigrate::config::loader::load_config;
///
/// let config = load_config("mlmigrate.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<MigrateConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MigrateError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        MigrateError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: MigrateConfig = toml::from_str(&contents)
        .map_err(|e| MigrateError::Configuration(format!("Failed to parse TOML: {e}")))?;

    finish(&mut config)?;
    Ok(config)
}

/// Loads the configuration file if it exists, otherwise starts from defaults
///
/// Environment overrides and validation apply in both cases. The CLI uses
/// this so that a config file is optional.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<MigrateConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(
        path = %path.display(),
        "Configuration file not found, using defaults"
    );
    let mut config = MigrateConfig::default();
    finish(&mut config)?;
    Ok(config)
}

fn finish(config: &mut MigrateConfig) -> Result<()> {
    apply_env_overrides(config);

    config.validate().map_err(|e| {
        MigrateError::Configuration(format!("Configuration validation failed: {e}"))
    })
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is a valid regex")
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(MigrateError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the MLMIGRATE_* prefix
///
/// Environment variables follow the pattern: MLMIGRATE_<SECTION>_<KEY>
/// For example: MLMIGRATE_SOURCE_HOST, MLMIGRATE_EXPORT_MAX_WORKERS
fn apply_env_overrides(config: &mut MigrateConfig) {
    let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

    if let Some(val) = var("MLMIGRATE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Endpoints
    if let Some(val) = var("MLMIGRATE_SOURCE_HOST") {
        config.source.host = Some(val);
    }
    if let Some(val) = var("MLMIGRATE_SOURCE_TOKEN") {
        config.source.token = Some(secret_string(val));
    }
    if let Some(val) = var("MLMIGRATE_DESTINATION_HOST") {
        config.destination.host = Some(val);
    }
    if let Some(val) = var("MLMIGRATE_DESTINATION_TOKEN") {
        config.destination.token = Some(secret_string(val));
    }

    // Export
    if let Some(val) = var("MLMIGRATE_EXPORT_OUTPUT_DIR") {
        config.export.output_dir = Some(val);
    }
    if let Some(val) = var("MLMIGRATE_EXPORT_USE_THREADS") {
        config.export.use_threads = val.parse().unwrap_or(false);
    }
    if let Some(val) = var("MLMIGRATE_EXPORT_MAX_WORKERS") {
        if let Ok(workers) = val.parse() {
            config.export.max_workers = workers;
        }
    }
    if let Some(val) = var("MLMIGRATE_EXPORT_DELETED_RUNS") {
        config.export.export_deleted_runs = val.parse().unwrap_or(false);
    }
    if let Some(val) = var("MLMIGRATE_EXPORT_RUN_START_TIME") {
        config.export.run_start_time = Some(val);
    }

    // Copy
    if let Some(val) = var("MLMIGRATE_COPY_LINEAGE_TAGS") {
        config.copy.copy_lineage_tags = val.parse().unwrap_or(false);
    }

    // Logging
    if let Some(val) = var("MLMIGRATE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Some(val) = var("MLMIGRATE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("MLMIGRATE_LOADER_TEST_VAR", "test_value");
        let input = "token = \"${MLMIGRATE_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "token = \"test_value\"\n");
        std::env::remove_var("MLMIGRATE_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("MLMIGRATE_LOADER_MISSING_VAR");
        let input = "token = \"${MLMIGRATE_LOADER_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        let input = "# token = \"${MLMIGRATE_LOADER_NEVER_SET}\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${MLMIGRATE_LOADER_NEVER_SET}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-mlmigrate.toml");
        assert!(matches!(result, Err(MigrateError::Configuration(_))));
    }

    #[test]
    fn test_load_config_or_default_missing_file() {
        let config = load_config_or_default("nonexistent-mlmigrate.toml").unwrap();
        assert_eq!(config.export.page_size, 1000);
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[source]
host = "https://src.example.com"
token = "src-token"

[destination]
host = "https://dst.example.com"
timeout_seconds = 30

[export]
output_dir = "out"
use_threads = true
max_workers = 8

[copy]
copy_lineage_tags = true
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.source.host.as_deref(), Some("https://src.example.com"));
        assert_eq!(
            config.source.token.as_ref().map(|t| t.expose_secret().to_string()),
            Some("src-token".to_string())
        );
        assert_eq!(config.destination.timeout_seconds, 30);
        assert!(config.export.use_threads);
        assert_eq!(config.export.max_workers, 8);
        assert!(config.copy.copy_lineage_tags);
    }

    #[test]
    fn test_load_config_invalid_values() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[export]\nmax_workers = 0\n")
            .unwrap();
        temp_file.flush().unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("max_workers"));
    }
}
