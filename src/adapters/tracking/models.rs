//! Request and response envelopes for the tracking REST API
//!
//! Entities themselves live in [`crate::domain`]; these types only describe
//! how they are wrapped on the wire.

use crate::domain::tags::Tag;
use crate::domain::{Experiment, Metric, ModelVersion, RegisteredModel, Run};
use serde::{Deserialize, Serialize};

/// Default `max_results` for run searches
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// `runs/log-batch` limits per call
pub const MAX_PARAMS_PER_BATCH: usize = 100;
pub const MAX_METRICS_PER_BATCH: usize = 1000;
pub const MAX_TAGS_PER_BATCH: usize = 100;

/// Which lifecycle stages a run search returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunViewType {
    #[default]
    ActiveOnly,
    DeletedOnly,
    All,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetExperimentResponse {
    pub experiment: Experiment,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateExperimentResponse {
    pub experiment_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetRunResponse {
    pub run: Run,
}

/// Body of `runs/search`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRunsRequest {
    pub experiment_ids: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    pub run_view_type: RunViewType,

    pub max_results: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

impl SearchRunsRequest {
    /// Search one experiment with default paging
    pub fn for_experiment(experiment_id: impl Into<String>) -> Self {
        Self {
            experiment_ids: vec![experiment_id.into()],
            filter: None,
            run_view_type: RunViewType::ActiveOnly,
            max_results: DEFAULT_PAGE_SIZE,
            page_token: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter.filter(|f| !f.trim().is_empty());
        self
    }

    pub fn with_view_type(mut self, view_type: RunViewType) -> Self {
        self.run_view_type = view_type;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRunsResponse {
    #[serde(default)]
    pub runs: Vec<Run>,

    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredModelResponse {
    pub registered_model: RegisteredModel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelVersionResponse {
    pub model_version: ModelVersion,
}

/// Body of `model-versions/create`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateModelVersionRequest {
    pub name: String,

    pub source: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,

    pub tags: Vec<Tag>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Query of `model-versions/search`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchModelVersionsRequest {
    pub filter: String,

    pub max_results: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

impl SearchModelVersionsRequest {
    /// All versions of one registered model
    pub fn for_model(name: &str) -> Self {
        Self {
            filter: format!("name='{}'", name.replace('\'', "\\'")),
            max_results: DEFAULT_PAGE_SIZE,
            page_token: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchModelVersionsResponse {
    #[serde(default)]
    pub model_versions: Vec<ModelVersion>,

    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Body of `runs/create`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateRunRequest {
    pub experiment_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,

    pub tags: Vec<Tag>,
}

/// Body of `runs/log-batch`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogBatchRequest {
    pub run_id: String,
    pub params: Vec<Tag>,
    pub metrics: Vec<Metric>,
    pub tags: Vec<Tag>,
}

impl LogBatchRequest {
    pub fn is_empty(&self) -> bool {
        self.params.is_empty() && self.metrics.is_empty() && self.tags.is_empty()
    }
}

/// Body of `runs/update`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateRunRequest {
    pub run_id: String,

    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
}
