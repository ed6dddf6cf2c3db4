//! Export experiment command implementation
//!
//! Writes `experiment.json` plus one directory per run under the output
//! directory.

use crate::adapters::tracking::{resolve_endpoint, EndpointRole, TrackingClient};
use crate::config::{load_config_or_default, MigrateConfig};
use crate::core::export::{
    ExperimentExporter, ExportMode, ExportRequest, ExportSummary, RunManifestExporter,
};
use crate::core::timestamp::parse_utc_millis;
use crate::domain::RunId;
use crate::log_options;
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the export-experiment command
#[derive(Args, Debug)]
pub struct ExportExperimentArgs {
    /// Experiment ID or name
    #[arg(long)]
    pub experiment: String,

    /// Output directory (overrides config)
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Export only these runs (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub run_ids: Vec<String>,

    /// Only export runs started at or after this UTC time (e.g. 2024-01-15)
    #[arg(long)]
    pub run_start_time: Option<String>,

    /// Include soft-deleted runs
    #[arg(long)]
    pub export_deleted_runs: bool,

    /// Export runs concurrently
    #[arg(long)]
    pub use_threads: bool,

    /// Worker pool size with --use-threads (overrides config)
    #[arg(long)]
    pub max_workers: Option<usize>,
}

impl ExportExperimentArgs {
    /// Execute the export-experiment command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Starting experiment export");

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

        let Some(output_dir) = config.export.output_dir.clone() else {
            eprintln!("Configuration error: --output-dir is required");
            return Ok(2);
        };

        let run_start_time = match config.export.run_start_time.as_deref() {
            Some(s) => match parse_utc_millis(s) {
                Ok(millis) => Some(millis),
                Err(e) => {
                    eprintln!("Configuration error: --run-start-time: {e}");
                    return Ok(2);
                }
            },
            None => None,
        };

        let run_ids = match self
            .run_ids
            .iter()
            .map(|id| RunId::new(id.trim()))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(ids) => ids,
            Err(e) => {
                eprintln!("Configuration error: --run-ids: {e}");
                return Ok(2);
            }
        };

        let experiment = &self.experiment;
        let export_deleted_runs = config.export.export_deleted_runs;
        let use_threads = config.export.use_threads;
        let max_workers = config.export.max_workers;
        let run_start_time_arg = &config.export.run_start_time;
        log_options!(
            experiment,
            output_dir,
            run_ids,
            run_start_time_arg,
            export_deleted_runs,
            use_threads,
            max_workers
        );

        let endpoint = match resolve_endpoint(EndpointRole::Source, &config.source) {
            Ok(e) => e,
            Err(e) => {
                tracing::error!(error = %e, "Failed to resolve source endpoint");
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let client = TrackingClient::new(&endpoint)?;
        let run_exporter = RunManifestExporter::new(client.tracking_uri())
            .with_export_deleted_runs(export_deleted_runs);
        let exporter = ExperimentExporter::new(client, Arc::new(run_exporter))
            .with_shutdown_signal(shutdown_signal);

        let request = ExportRequest::new(experiment.clone(), &output_dir)
            .with_run_ids(run_ids)
            .with_run_start_time(run_start_time)
            .with_export_deleted_runs(export_deleted_runs)
            .with_mode(ExportMode::from_config(&config.export))
            .with_page_size(config.export.page_size);

        println!("🚀 Exporting experiment '{experiment}' to {output_dir}");
        let summary = exporter.export(&request).await?;
        print_summary(&summary);

        Ok(exit_code(&summary))
    }

    fn apply_overrides(&self, config: &mut MigrateConfig) -> Result<(), String> {
        if let Some(dir) = &self.output_dir {
            config.export.output_dir = Some(dir.clone());
        }
        if let Some(start) = &self.run_start_time {
            config.export.run_start_time = Some(start.clone());
        }
        if self.export_deleted_runs {
            config.export.export_deleted_runs = true;
        }
        if self.use_threads {
            config.export.use_threads = true;
        }
        if let Some(workers) = self.max_workers {
            config.export.max_workers = workers;
        }
        config.validate()
    }
}

fn print_summary(summary: &ExportSummary) {
    println!();
    println!("📊 Export Summary:");
    println!(
        "  Experiment: {} ({})",
        summary.experiment_name, summary.experiment_id
    );
    println!("  Total runs: {}", summary.num_total_runs());
    println!("  Exported: {}", summary.num_ok_runs());
    println!("  Failed: {}", summary.num_failed_runs());
    println!("  Skipped: {}", summary.num_skipped_runs);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!("  Manifest: {}", summary.manifest_path.display());

    if !summary.failed_runs.is_empty() {
        println!();
        println!("⚠️  Failed runs:");
        for run_id in summary.failed_runs.iter().take(10) {
            println!("  - {run_id}");
        }
        if summary.failed_runs.len() > 10 {
            println!("  ... and {} more", summary.failed_runs.len() - 10);
        }
    }

    if let Some(error) = &summary.search_error {
        println!();
        println!("❌ Run search stopped early: {error}");
    }
    println!();
}

/// Per-run failures still complete the command; a broken run search does not
fn exit_code(summary: &ExportSummary) -> i32 {
    if summary.search_error.is_some() {
        5
    } else if summary.interrupted {
        println!("⚠️  Export interrupted. Manifests written so far are valid.");
        130
    } else if summary.is_empty() {
        println!("⚠️  No runs exported");
        0
    } else if summary.failed_runs.is_empty() {
        println!("✅ Export completed successfully!");
        0
    } else {
        println!("⚠️  Export completed with failures");
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExperimentId;
    use std::path::PathBuf;
    use std::time::Duration;

    fn summary() -> ExportSummary {
        ExportSummary {
            experiment_id: ExperimentId::new("1").unwrap(),
            experiment_name: "wine".to_string(),
            ok_runs: vec![RunId::new("a").unwrap()],
            failed_runs: vec![],
            num_skipped_runs: 0,
            manifest_path: PathBuf::from("out/experiment.json"),
            duration: Duration::from_millis(10),
            interrupted: false,
            search_error: None,
        }
    }

    #[test]
    fn test_exit_code_with_run_failures_is_zero() {
        let mut s = summary();
        s.failed_runs.push(RunId::new("b").unwrap());
        assert_eq!(exit_code(&s), 0);
    }

    #[test]
    fn test_exit_code_search_error_is_fatal() {
        let mut s = summary();
        s.search_error = Some("503".to_string());
        assert_eq!(exit_code(&s), 5);
    }

    #[test]
    fn test_exit_code_interrupted() {
        let mut s = summary();
        s.interrupted = true;
        assert_eq!(exit_code(&s), 130);
    }

    #[test]
    fn test_overrides_apply_and_validate() {
        let args = ExportExperimentArgs {
            experiment: "1".to_string(),
            output_dir: Some("out".to_string()),
            run_ids: vec![],
            run_start_time: Some("2024-01-15".to_string()),
            export_deleted_runs: true,
            use_threads: true,
            max_workers: Some(0),
        };
        let mut config = MigrateConfig::default();
        assert!(args.apply_overrides(&mut config).is_err());

        let args = ExportExperimentArgs {
            max_workers: Some(2),
            ..args
        };
        let mut config = MigrateConfig::default();
        args.apply_overrides(&mut config).unwrap();
        assert_eq!(config.export.output_dir.as_deref(), Some("out"));
        assert!(config.export.use_threads);
        assert!(config.export.export_deleted_runs);
        assert_eq!(config.export.max_workers, 2);
    }
}
