//! Run entity

use super::experiment::LifecycleStage;
use super::ids::{ExperimentId, RunId};
use super::tags::{deserialize_tag_map, TagMap};
use serde::{Deserialize, Serialize};

/// One recorded execution belonging to an experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Run attributes
    pub info: RunInfo,

    /// Params, metrics and tags
    #[serde(default)]
    pub data: RunData,
}

impl Run {
    /// Run ID
    pub fn id(&self) -> &RunId {
        &self.info.run_id
    }

    /// Whether the run is soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.info.lifecycle_stage == LifecycleStage::Deleted
    }

    /// Look up a tag value
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.data.tags.get(key).map(String::as_str)
    }
}

/// Run attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    /// Run ID
    #[serde(alias = "run_uuid")]
    pub run_id: RunId,

    /// Parent experiment ID
    pub experiment_id: ExperimentId,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_name: Option<String>,

    /// Owner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Status (RUNNING, SCHEDULED, FINISHED, FAILED, KILLED)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Start time in epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,

    /// End time in epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,

    /// Artifact root URI
    #[serde(default)]
    pub artifact_uri: String,

    /// Lifecycle stage
    #[serde(default)]
    pub lifecycle_stage: LifecycleStage,
}

/// Run params, metrics and tags
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunData {
    /// Params (key -> value)
    #[serde(default, deserialize_with = "deserialize_tag_map")]
    pub params: TagMap,

    /// Latest metric values
    #[serde(default)]
    pub metrics: Vec<Metric>,

    /// Run tags
    #[serde(default, deserialize_with = "deserialize_tag_map")]
    pub tags: TagMap,
}

/// A logged metric value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Metric name
    pub key: String,

    /// Value
    pub value: f64,

    /// Epoch milliseconds
    #[serde(default)]
    pub timestamp: i64,

    /// Step
    #[serde(default)]
    pub step: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_from_wire() {
        let json = r#"{
            "info": {
                "run_uuid": "48cf29167ddb4e098da780f0959fb4cf",
                "experiment_id": "3",
                "status": "FINISHED",
                "start_time": 1700000000000,
                "artifact_uri": "/opt/mlruns/3/48cf29167ddb4e098da780f0959fb4cf/artifacts",
                "lifecycle_stage": "deleted"
            },
            "data": {
                "params": [{"key": "alpha", "value": "0.5"}],
                "metrics": [{"key": "rmse", "value": 0.7, "timestamp": 1, "step": 0}],
                "tags": [{"key": "mlflow.user", "value": "me"}]
            }
        }"#;
        let run: Run = serde_json::from_str(json).unwrap();
        assert_eq!(run.id().as_str(), "48cf29167ddb4e098da780f0959fb4cf");
        assert!(run.is_deleted());
        assert_eq!(run.tag("mlflow.user"), Some("me"));
        assert_eq!(run.data.params.get("alpha").map(String::as_str), Some("0.5"));
        assert_eq!(run.data.metrics.len(), 1);
    }

    #[test]
    fn test_run_without_data() {
        let json = r#"{"info": {"run_id": "r1", "experiment_id": "0"}}"#;
        let run: Run = serde_json::from_str(json).unwrap();
        assert!(run.data.tags.is_empty());
        assert!(!run.is_deleted());
        assert!(run.info.start_time.is_none());
    }
}
