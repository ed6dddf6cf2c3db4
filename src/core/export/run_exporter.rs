//! Single-run export

use super::manifest::{run_document, ExportManifest, RUN_MANIFEST};
use crate::domain::{Result, Run};
use async_trait::async_trait;
use serde_json::json;
use std::path::Path;

/// Exports one run into its own directory
///
/// `Ok(true)` means the run was exported, `Ok(false)` that it was declined
/// (counted as a failure by the caller).
#[async_trait]
pub trait RunExporter: Send + Sync {
    async fn export_run(&self, run: &Run, output_dir: &Path) -> Result<bool>;
}

/// Writes `run.json` with info, params, metrics and tags
///
/// Artifacts are not downloaded.
#[derive(Debug, Clone)]
pub struct RunManifestExporter {
    source_tracking_uri: String,
    export_deleted_runs: bool,
}

impl RunManifestExporter {
    pub fn new(source_tracking_uri: impl Into<String>) -> Self {
        Self {
            source_tracking_uri: source_tracking_uri.into(),
            export_deleted_runs: false,
        }
    }

    pub fn with_export_deleted_runs(mut self, export_deleted_runs: bool) -> Self {
        self.export_deleted_runs = export_deleted_runs;
        self
    }
}

#[async_trait]
impl RunExporter for RunManifestExporter {
    async fn export_run(&self, run: &Run, output_dir: &Path) -> Result<bool> {
        if run.is_deleted() && !self.export_deleted_runs {
            tracing::warn!(
                run_id = %run.id(),
                "Run is deleted and deleted runs are not exported"
            );
            return Ok(false);
        }

        let manifest = ExportManifest::new(run_document(run)?, &self.source_tracking_uri, json!({}));
        manifest.write(output_dir, RUN_MANIFEST).await?;

        tracing::debug!(run_id = %run.id(), dir = %output_dir.display(), "Exported run");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn run(lifecycle_stage: &str) -> Run {
        serde_json::from_value(json!({
            "info": {
                "run_id": "r1",
                "experiment_id": "1",
                "start_time": 1_700_000_000_000i64,
                "lifecycle_stage": lifecycle_stage
            },
            "data": {"params": [{"key": "alpha", "value": "0.1"}]}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_writes_run_manifest() {
        let dir = TempDir::new().unwrap();
        let exporter = RunManifestExporter::new("http://src");

        let ok = exporter
            .export_run(&run("active"), &dir.path().join("r1"))
            .await
            .unwrap();
        assert!(ok);

        let text = std::fs::read_to_string(dir.path().join("r1").join(RUN_MANIFEST)).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["summary"]["info"]["run_id"], "r1");
        assert_eq!(doc["summary"]["info"]["_start_time"], "2023-11-14 22:13:20");
        assert_eq!(doc["summary"]["params"]["alpha"], "0.1");
    }

    #[tokio::test]
    async fn test_declines_deleted_run() {
        let dir = TempDir::new().unwrap();
        let exporter = RunManifestExporter::new("http://src");
        assert!(!exporter.export_run(&run("deleted"), dir.path()).await.unwrap());

        let exporter = exporter.with_export_deleted_runs(true);
        assert!(exporter.export_run(&run("deleted"), dir.path()).await.unwrap());
    }
}
