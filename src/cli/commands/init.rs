//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::log_options;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "mlmigrate.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");
        let (output, with_examples, force) = (&self.output, self.with_examples, self.force);
        log_options!(output, with_examples, force);

        println!("📝 Initializing mlmigrate configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your server URLs", self.output);
                println!("  2. Provide tokens through the environment or a .env file:");
                println!("     - MLFLOW_TRACKING_TOKEN or DATABRICKS_TOKEN (source)");
                println!("     - DATABRICKS_TOKEN_DST (destination)");
                println!("  3. Validate configuration: mlmigrate validate-config");
                println!("  4. Export: mlmigrate export-experiment --experiment <id|name>");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# mlmigrate configuration file

[application]
log_level = "info"

[source]
host = "http://localhost:5000"

[destination]
host = "https://my-workspace.cloud.databricks.com"

[export]
output_dir = "out"

[copy]
copy_lineage_tags = false
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# mlmigrate configuration file
#
# Every section is optional. Anything left out falls back to defaults, and
# endpoints fall back to the environment:
#   source:      MLFLOW_TRACKING_URI, DATABRICKS_HOST, MLFLOW_TRACKING_TOKEN, DATABRICKS_TOKEN
#   destination: the same variables with a _DST suffix, then the source ones
#
# Values may reference environment variables with ${VAR} syntax. Any
# MLMIGRATE_<SECTION>_<KEY> variable overrides the value in this file.

[application]
# trace | debug | info | warn | error
log_level = "info"

[source]
host = "http://localhost:5000"
# token = "${MLFLOW_TRACKING_TOKEN}"
timeout_seconds = 15

[destination]
host = "https://my-workspace.cloud.databricks.com"
# token = "${DATABRICKS_TOKEN_DST}"
timeout_seconds = 15

[export]
output_dir = "out"

# Export runs on a bounded worker pool
use_threads = false
max_workers = 4

# Include soft-deleted runs
export_deleted_runs = false

# Only export runs started at or after this UTC time
# run_start_time = "2024-01-15"

page_size = 1000

[copy]
# Tag destination versions with the source server, model, version and run
copy_lineage_tags = false

[logging]
# JSON log files in addition to console output
local_enabled = false
local_path = "logs"
# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use tempfile::TempDir;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "mlmigrate.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "mlmigrate.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generate_minimal_config() {
        let config = InitArgs::generate_minimal_config();
        assert!(config.contains("[source]"));
        assert!(config.contains("[destination]"));
        assert!(config.contains("[export]"));
    }

    #[tokio::test]
    async fn test_generated_configs_load() {
        let dir = TempDir::new().unwrap();
        for with_examples in [false, true] {
            let output = dir.path().join(format!("mlmigrate-{with_examples}.toml"));
            let args = InitArgs {
                output: output.display().to_string(),
                with_examples,
                force: false,
            };
            assert_eq!(args.execute().await.unwrap(), 0);

            let config = load_config(&output).unwrap();
            assert_eq!(config.export.output_dir.as_deref(), Some("out"));
        }
    }

    #[tokio::test]
    async fn test_existing_file_requires_force() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("mlmigrate.toml");
        std::fs::write(&output, "").unwrap();

        let mut args = InitArgs {
            output: output.display().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);

        args.force = true;
        assert_eq!(args.execute().await.unwrap(), 0);
    }
}
