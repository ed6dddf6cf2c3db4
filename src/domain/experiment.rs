//! Experiment entity

use super::ids::ExperimentId;
use super::tags::{deserialize_tag_map, TagMap};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle stage shared by experiments and runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStage {
    /// Visible and usable
    #[default]
    Active,
    /// Soft-deleted
    Deleted,
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleStage::Active => write!(f, "active"),
            LifecycleStage::Deleted => write!(f, "deleted"),
        }
    }
}

/// A named container of runs, as read from a tracking server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    /// Experiment ID
    pub experiment_id: ExperimentId,

    /// Experiment name (a workspace path on some platforms)
    pub name: String,

    /// Root artifact location for runs of this experiment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_location: Option<String>,

    /// Lifecycle stage
    #[serde(default)]
    pub lifecycle_stage: LifecycleStage,

    /// Creation time in epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<i64>,

    /// Last update time in epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<i64>,

    /// Experiment tags
    #[serde(default, deserialize_with = "deserialize_tag_map")]
    pub tags: TagMap,
}

impl Experiment {
    /// Experiment type tag, when the platform sets one
    pub fn experiment_type(&self) -> Option<&str> {
        self.tags.get("mlflow.experimentType").map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experiment_from_wire() {
        let json = r#"{
            "experiment_id": "1",
            "name": "/Users/me/wine",
            "artifact_location": "dbfs:/databricks/mlflow-tracking/1",
            "lifecycle_stage": "active",
            "creation_time": 1700000000000,
            "tags": [{"key": "mlflow.experimentType", "value": "MLFLOW_EXPERIMENT"}]
        }"#;
        let exp: Experiment = serde_json::from_str(json).unwrap();
        assert_eq!(exp.experiment_id.as_str(), "1");
        assert_eq!(exp.lifecycle_stage, LifecycleStage::Active);
        assert_eq!(exp.experiment_type(), Some("MLFLOW_EXPERIMENT"));
        assert!(exp.last_update_time.is_none());
    }
}
