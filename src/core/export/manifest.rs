//! Export manifest files
//!
//! Every exported entity is written as `{"summary": ..., "metadata": ...}`,
//! where `summary` is the entity and `metadata` identifies the tool, the
//! export time and the source server.

use crate::core::timestamp::{fmt_ts_millis, now_millis};
use crate::domain::{Experiment, Result, Run};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

pub const EXPERIMENT_MANIFEST: &str = "experiment.json";
pub const RUN_MANIFEST: &str = "run.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

impl Default for ToolInfo {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestMetadata<I: Serialize> {
    /// Epoch millis
    pub export_time: i64,
    #[serde(rename = "_export_time")]
    pub export_time_formatted: String,
    pub tool: ToolInfo,
    pub source_tracking_uri: String,
    pub info: I,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportManifest<S: Serialize, I: Serialize> {
    pub summary: S,
    pub metadata: ManifestMetadata<I>,
}

impl<S: Serialize, I: Serialize> ExportManifest<S, I> {
    /// Manifest stamped with the current time
    pub fn new(summary: S, source_tracking_uri: impl Into<String>, info: I) -> Self {
        let export_time = now_millis();
        Self {
            summary,
            metadata: ManifestMetadata {
                export_time,
                export_time_formatted: fmt_ts_millis(export_time),
                tool: ToolInfo::default(),
                source_tracking_uri: source_tracking_uri.into(),
                info,
            },
        }
    }

    /// Write pretty JSON to `<dir>/<file_name>`, creating `dir` if needed
    pub async fn write(&self, dir: &Path, file_name: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(file_name);
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, contents).await?;
        tracing::debug!(path = %path.display(), "Wrote manifest");
        Ok(path)
    }
}

/// Experiment as written to `experiment.json`: entity fields plus
/// `_creation_time` and `_last_update_time`, tags sorted by key
pub fn experiment_document(experiment: &Experiment) -> Result<Value> {
    let mut doc = serde_json::to_value(experiment)?;
    if let Value::Object(map) = &mut doc {
        insert_formatted(map, "_creation_time", experiment.creation_time);
        insert_formatted(map, "_last_update_time", experiment.last_update_time);
    }
    Ok(doc)
}

/// Run as written to `run.json`
pub fn run_document(run: &Run) -> Result<Value> {
    let mut info = serde_json::to_value(&run.info)?;
    if let Value::Object(map) = &mut info {
        insert_formatted(map, "_start_time", run.info.start_time);
        insert_formatted(map, "_end_time", run.info.end_time);
    }
    Ok(json!({
        "info": info,
        "params": run.data.params,
        "metrics": run.data.metrics,
        "tags": run.data.tags,
    }))
}

fn insert_formatted(map: &mut Map<String, Value>, key: &str, millis: Option<i64>) {
    let value = millis.map(fmt_ts_millis).map(Value::String).unwrap_or(Value::Null);
    map.insert(key.to_string(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn experiment() -> Experiment {
        serde_json::from_value(json!({
            "experiment_id": "1",
            "name": "wine",
            "creation_time": 1_700_000_000_000i64,
            "tags": [{"key": "z", "value": "1"}, {"key": "a", "value": "2"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_experiment_document() {
        let doc = experiment_document(&experiment()).unwrap();
        assert_eq!(doc["_creation_time"], "2023-11-14 22:13:20");
        assert_eq!(doc["_last_update_time"], Value::Null);

        let keys: Vec<&String> = doc["tags"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["a", "z"]);
    }

    #[tokio::test]
    async fn test_manifest_write() {
        let dir = TempDir::new().unwrap();
        let manifest = ExportManifest::new(json!({"k": 1}), "http://src", json!({}));
        let path = manifest
            .write(&dir.path().join("nested"), EXPERIMENT_MANIFEST)
            .await
            .unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written["summary"]["k"], 1);
        assert_eq!(written["metadata"]["tool"]["name"], "mlmigrate");
        assert_eq!(written["metadata"]["source_tracking_uri"], "http://src");
        assert!(written["metadata"]["export_time"].is_i64());
        assert!(written["metadata"]["_export_time"].is_string());
    }
}
