//! Registered model and model version entities

use super::ids::{ModelName, RunId, VersionNumber};
use super::tags::{deserialize_tag_map, TagMap};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classic-registry lifecycle label on a model version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Stage {
    /// No stage assigned
    #[default]
    None,
    /// Staging
    Staging,
    /// Production
    Production,
    /// Archived
    Archived,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::None => "None",
            Stage::Staging => "Staging",
            Stage::Production => "Production",
            Stage::Archived => "Archived",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Stage::None),
            "staging" => Ok(Stage::Staging),
            "production" => Ok(Stage::Production),
            "archived" => Ok(Stage::Archived),
            _ => Err(format!(
                "Invalid stage '{s}'. Must be one of: None, Staging, Production, Archived"
            )),
        }
    }
}

/// A named entry in the model registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredModel {
    /// Model name
    pub name: ModelName,

    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Model tags
    #[serde(default, deserialize_with = "deserialize_tag_map")]
    pub tags: TagMap,
}

/// A versioned pointer from the registry to a run's artifact subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVersion {
    /// Registered model name
    pub name: ModelName,

    /// Version number, assigned by the registry on creation
    pub version: VersionNumber,

    /// Source artifact URI
    #[serde(default)]
    pub source: String,

    /// Run that produced the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,

    /// Stage (classic registries only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stage: Option<Stage>,

    /// Aliases pointing at this version
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Version tags
    #[serde(default, deserialize_with = "deserialize_tag_map")]
    pub tags: TagMap,

    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Registration status (READY, PENDING_REGISTRATION, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Creation time in epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<i64>,

    /// Last update time in epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_timestamp: Option<i64>,
}

impl ModelVersion {
    /// `name/version` display form
    pub fn uri(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}
