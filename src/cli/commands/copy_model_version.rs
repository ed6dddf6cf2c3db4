//! Copy model version command implementation

use crate::adapters::tracking::{resolve_endpoint, EndpointRole, TrackingClient};
use crate::config::{load_config_or_default, secret_string, MigrateConfig};
use crate::core::copy::{CopyOutcome, CopyRequest, CopySummary, ModelVersionCopier};
use crate::domain::{ModelName, VersionNumber};
use crate::log_options;
use clap::Args;

/// Arguments for the copy-model-version command
#[derive(Args, Debug)]
pub struct CopyModelVersionArgs {
    /// Source registered model name
    #[arg(long)]
    pub src_model: String,

    /// Source version number
    #[arg(long, required_unless_present = "all_versions")]
    pub src_version: Option<String>,

    /// Destination registered model name (`catalog.schema.model` for a catalog registry)
    #[arg(long)]
    pub dst_model: String,

    /// Copy the source run into this destination experiment
    ///
    /// Only run metadata is copied. Artifact bytes are not transferred, so the
    /// new version's source points at artifacts that do not exist yet.
    #[arg(long)]
    pub dst_experiment_name: Option<String>,

    /// Add provenance tags to the destination version
    #[arg(long)]
    pub copy_lineage_tags: bool,

    /// Copy every version of the source model
    #[arg(long, conflicts_with = "src_version")]
    pub all_versions: bool,

    /// Source server URL (overrides config and environment)
    #[arg(long)]
    pub src_host: Option<String>,

    /// Source token (overrides config and environment)
    #[arg(long)]
    pub src_token: Option<String>,

    /// Destination server URL (overrides config and environment)
    #[arg(long)]
    pub dst_host: Option<String>,

    /// Destination token (overrides config and environment)
    #[arg(long)]
    pub dst_token: Option<String>,
}

impl CopyModelVersionArgs {
    /// Execute the copy-model-version command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Starting model version copy");

        let mut config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        if let Err(e) = self.apply_overrides(&mut config) {
            eprintln!("Configuration error: {e}");
            return Ok(2);
        }

        let (src_model, dst_model) =
            match (ModelName::new(&self.src_model), ModelName::new(&self.dst_model)) {
                (Ok(src), Ok(dst)) => (src, dst),
                (Err(e), _) | (_, Err(e)) => {
                    eprintln!("Configuration error: {e}");
                    return Ok(2);
                }
            };

        let src_version = match self.src_version.as_deref().map(str::parse::<VersionNumber>) {
            Some(Ok(v)) => Some(v),
            Some(Err(e)) => {
                eprintln!("Configuration error: --src-version: {e}");
                return Ok(2);
            }
            None => None,
        };

        let dst_experiment_name = &self.dst_experiment_name;
        let copy_lineage_tags = config.copy.copy_lineage_tags;
        let all_versions = self.all_versions;
        log_options!(
            src_model,
            src_version,
            dst_model,
            dst_experiment_name,
            copy_lineage_tags,
            all_versions
        );

        let src_endpoint = match resolve_endpoint(EndpointRole::Source, &config.source) {
            Ok(e) => e,
            Err(e) => {
                tracing::error!(error = %e, "Failed to resolve source endpoint");
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };
        let dst_endpoint = match resolve_endpoint(EndpointRole::Destination, &config.destination)
        {
            Ok(e) => e,
            Err(e) => {
                tracing::error!(error = %e, "Failed to resolve destination endpoint");
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let copier = ModelVersionCopier::new(
            TrackingClient::new(&src_endpoint)?,
            TrackingClient::new(&dst_endpoint)?,
        );

        match src_version {
            Some(src_version) => {
                let request = CopyRequest {
                    src_model,
                    src_version,
                    dst_model,
                    dst_experiment_name: dst_experiment_name.clone(),
                    copy_lineage_tags,
                };
                match copier.copy(&request).await {
                    Ok(outcome) => {
                        print_outcome(&outcome);
                        Ok(0)
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Model version copy failed");
                        eprintln!("❌ Copy failed: {e}");
                        Ok(5)
                    }
                }
            }
            None => {
                let summary = copier
                    .copy_all_versions(
                        &src_model,
                        &dst_model,
                        dst_experiment_name.as_deref(),
                        copy_lineage_tags,
                    )
                    .await?;
                print_summary(&summary);
                Ok(0)
            }
        }
    }

    fn apply_overrides(&self, config: &mut MigrateConfig) -> Result<(), String> {
        if let Some(host) = &self.src_host {
            config.source.host = Some(host.clone());
        }
        if let Some(token) = &self.src_token {
            config.source.token = Some(secret_string(token.clone()));
        }
        if let Some(host) = &self.dst_host {
            config.destination.host = Some(host.clone());
        }
        if let Some(token) = &self.dst_token {
            config.destination.token = Some(secret_string(token.clone()));
        }
        if self.copy_lineage_tags {
            config.copy.copy_lineage_tags = true;
        }
        config.validate()
    }
}

fn print_outcome(outcome: &CopyOutcome) {
    println!(
        "✅ Copied {} version {} to {} version {}",
        outcome.src_version.name,
        outcome.src_version.version,
        outcome.dst_version.name,
        outcome.dst_version.version
    );
    for failure in &outcome.alias_failures {
        println!("⚠️  {failure}");
    }
}

fn print_summary(summary: &CopySummary) {
    println!();
    println!("📊 Copy Summary:");
    println!("  Versions: {}", summary.total());
    println!("  Copied: {}", summary.ok.len());
    println!("  Failed: {}", summary.failed.len());
    for copied in &summary.ok {
        println!("  - {} -> {}", copied.src_version, copied.dst_version);
    }
    if summary.has_failures() {
        println!();
        println!("⚠️  Failed versions:");
        for failed in &summary.failed {
            println!("  - {}: {}", failed.src_version, failed.error);
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn args() -> CopyModelVersionArgs {
        CopyModelVersionArgs {
            src_model: "wine".to_string(),
            src_version: Some("1".to_string()),
            dst_model: "main.ml.wine".to_string(),
            dst_experiment_name: None,
            copy_lineage_tags: true,
            all_versions: false,
            src_host: Some("http://src:5000".to_string()),
            src_token: None,
            dst_host: Some("https://dst.example.com".to_string()),
            dst_token: Some("dapi-dst".to_string()),
        }
    }

    #[test]
    fn test_dst_experiment_help_warns_about_artifacts() {
        use clap::CommandFactory;

        let cli = crate::cli::Cli::command();
        let command = cli
            .find_subcommand("copy-model-version")
            .expect("subcommand registered");
        let arg = command
            .get_arguments()
            .find(|a| a.get_id() == "dst_experiment_name")
            .expect("argument registered");
        let help = arg.get_long_help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("Artifact bytes are not transferred"), "{help}");
    }

    #[test]
    fn test_overrides_apply_to_endpoints() {
        let mut config = MigrateConfig::default();
        args().apply_overrides(&mut config).unwrap();

        assert_eq!(config.source.host.as_deref(), Some("http://src:5000"));
        assert_eq!(
            config.destination.host.as_deref(),
            Some("https://dst.example.com")
        );
        assert_eq!(
            config
                .destination
                .token
                .as_ref()
                .map(|t| t.expose_secret().to_string()),
            Some("dapi-dst".to_string())
        );
        assert!(config.copy.copy_lineage_tags);
    }

    #[test]
    fn test_invalid_host_override_is_rejected() {
        let args = CopyModelVersionArgs {
            dst_host: Some("not a url".to_string()),
            ..args()
        };
        let mut config = MigrateConfig::default();
        assert!(args.apply_overrides(&mut config).is_err());
    }

    #[tokio::test]
    async fn test_bad_version_is_a_config_error() {
        let args = CopyModelVersionArgs {
            src_version: Some("zero".to_string()),
            ..args()
        };
        let code = args
            .execute("nonexistent-mlmigrate.toml")
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
