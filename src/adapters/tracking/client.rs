//! Typed tracking and model registry API
//!
//! [`TrackingClient`] turns the raw JSON transport into domain entities. It
//! adds no policy of its own: every remote error is returned to the caller.

use super::http::HttpClient;
use super::models::{
    CreateExperimentResponse, CreateModelVersionRequest, CreateRunRequest, GetExperimentResponse,
    GetRunResponse, LogBatchRequest, ModelVersionResponse, RunViewType, SearchModelVersionsRequest,
    SearchModelVersionsResponse, SearchRunsRequest, SearchRunsResponse, UpdateRunRequest,
};
use super::pagination::{SearchModelVersionsIterator, SearchRunsIterator};
use crate::config::EndpointConfig;
use crate::domain::{
    Experiment, ExperimentId, MigrateError, ModelName, ModelVersion, Result, Run, RunId, Stage,
    VersionNumber,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// Client for one tracking server
#[derive(Debug, Clone)]
pub struct TrackingClient {
    http: HttpClient,
}

impl TrackingClient {
    /// Connect to the tracking API of an endpoint
    pub fn new(endpoint: &EndpointConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::tracking(endpoint)?,
        })
    }

    /// Wrap an existing transport
    pub fn from_http(http: HttpClient) -> Self {
        Self { http }
    }

    /// The underlying transport
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Host this client talks to, used in lineage tags and manifests
    pub fn tracking_uri(&self) -> &str {
        self.http.host()
    }

    // ---- experiments ----

    pub async fn get_experiment(&self, experiment_id: &ExperimentId) -> Result<Experiment> {
        let rsp: GetExperimentResponse = self
            .get("experiments/get", json!({"experiment_id": experiment_id.as_str()}))
            .await?;
        Ok(rsp.experiment)
    }

    /// Look up an experiment by name; `Ok(None)` if it does not exist
    pub async fn get_experiment_by_name(&self, name: &str) -> Result<Option<Experiment>> {
        match self
            .get::<GetExperimentResponse>("experiments/get-by-name", json!({"experiment_name": name}))
            .await
        {
            Ok(rsp) => Ok(Some(rsp.experiment)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Resolve an experiment from an id, falling back to a name lookup
    ///
    /// # Errors
    ///
    /// [`MigrateError::SourceNotFound`] when neither lookup finds it.
    pub async fn resolve_experiment(&self, id_or_name: &str) -> Result<Experiment> {
        if let Ok(id) = ExperimentId::new(id_or_name) {
            match self.get_experiment(&id).await {
                Ok(experiment) => return Ok(experiment),
                Err(e) if is_not_found(&e) || is_bad_request(&e) => {
                    tracing::debug!(
                        experiment = id_or_name,
                        "No experiment with this id, trying lookup by name"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        self.get_experiment_by_name(id_or_name)
            .await?
            .ok_or_else(|| MigrateError::SourceNotFound(format!("experiment '{id_or_name}'")))
    }

    pub async fn create_experiment(&self, name: &str) -> Result<ExperimentId> {
        let rsp: CreateExperimentResponse =
            self.post("experiments/create", json!({"name": name})).await?;
        ExperimentId::new(rsp.experiment_id).map_err(MigrateError::Validation)
    }

    /// Return the experiment id for a name, creating the experiment if needed
    pub async fn get_or_create_experiment(&self, name: &str) -> Result<ExperimentId> {
        if let Some(experiment) = self.get_experiment_by_name(name).await? {
            return Ok(experiment.experiment_id);
        }
        let id = self.create_experiment(name).await?;
        tracing::info!(experiment = name, experiment_id = %id, "Created experiment");
        Ok(id)
    }

    // ---- runs ----

    pub async fn get_run(&self, run_id: &RunId) -> Result<Run> {
        let rsp: GetRunResponse = self.get("runs/get", json!({"run_id": run_id.as_str()})).await?;
        Ok(rsp.run)
    }

    /// Fetch one page of `runs/search`
    pub async fn search_runs_page(&self, request: &SearchRunsRequest) -> Result<SearchRunsResponse> {
        self.post("runs/search", serde_json::to_value(request)?).await
    }

    /// Lazily iterate all runs of an experiment
    pub fn search_runs(
        &self,
        experiment_id: &ExperimentId,
        filter: Option<String>,
        view_type: RunViewType,
        page_size: usize,
    ) -> SearchRunsIterator {
        let request = SearchRunsRequest::for_experiment(experiment_id.as_str())
            .with_filter(filter)
            .with_view_type(view_type)
            .with_max_results(page_size);
        SearchRunsIterator::new(self.clone(), request)
    }

    pub async fn create_run(&self, request: &CreateRunRequest) -> Result<Run> {
        let rsp: GetRunResponse = self.post("runs/create", serde_json::to_value(request)?).await?;
        Ok(rsp.run)
    }

    pub async fn log_batch(&self, request: &LogBatchRequest) -> Result<()> {
        self.http
            .post("runs/log-batch", Some(&serde_json::to_value(request)?))
            .await?;
        Ok(())
    }

    pub async fn update_run(&self, request: &UpdateRunRequest) -> Result<()> {
        self.http
            .post("runs/update", Some(&serde_json::to_value(request)?))
            .await?;
        Ok(())
    }

    // ---- model registry ----

    /// Create a registered model
    ///
    /// Returns `true` if it was created and `false` if it already existed.
    pub async fn create_registered_model(&self, name: &ModelName) -> Result<bool> {
        match self
            .http
            .post("registered-models/create", Some(&json!({"name": name.as_str()})))
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_remote().is_some_and(|r| r.is_already_exists()) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn get_model_version(
        &self,
        name: &ModelName,
        version: VersionNumber,
    ) -> Result<ModelVersion> {
        let rsp: ModelVersionResponse = self
            .get(
                "model-versions/get",
                json!({"name": name.as_str(), "version": version.to_string()}),
            )
            .await?;
        Ok(rsp.model_version)
    }

    pub async fn create_model_version(
        &self,
        request: &CreateModelVersionRequest,
    ) -> Result<ModelVersion> {
        let rsp: ModelVersionResponse = self
            .post("model-versions/create", serde_json::to_value(request)?)
            .await?;
        Ok(rsp.model_version)
    }

    /// Move a version to a stage without archiving other versions
    pub async fn transition_stage(
        &self,
        name: &ModelName,
        version: VersionNumber,
        stage: Stage,
    ) -> Result<ModelVersion> {
        let rsp: ModelVersionResponse = self
            .post(
                "model-versions/transition-stage",
                json!({
                    "name": name.as_str(),
                    "version": version.to_string(),
                    "stage": stage.to_string(),
                    "archive_existing_versions": false
                }),
            )
            .await?;
        Ok(rsp.model_version)
    }

    pub async fn set_alias(&self, name: &ModelName, alias: &str, version: VersionNumber) -> Result<()> {
        self.http
            .post(
                "registered-models/alias",
                Some(&json!({
                    "name": name.as_str(),
                    "alias": alias,
                    "version": version.to_string()
                })),
            )
            .await?;
        Ok(())
    }

    /// Fetch one page of `model-versions/search`
    pub async fn search_model_versions_page(
        &self,
        request: &SearchModelVersionsRequest,
    ) -> Result<SearchModelVersionsResponse> {
        self.get("model-versions/search", serde_json::to_value(request)?)
            .await
    }

    /// Lazily iterate every version of a registered model
    pub fn search_model_versions(&self, name: &ModelName) -> SearchModelVersionsIterator {
        SearchModelVersionsIterator::new(
            self.clone(),
            SearchModelVersionsRequest::for_model(name.as_str()),
        )
    }

    async fn get<T: DeserializeOwned>(&self, resource: &str, params: Value) -> Result<T> {
        let value = self.http.get(resource, Some(&params)).await?;
        decode(resource, value)
    }

    async fn post<T: DeserializeOwned>(&self, resource: &str, body: Value) -> Result<T> {
        let value = self.http.post(resource, Some(&body)).await?;
        decode(resource, value)
    }
}

fn decode<T: DeserializeOwned>(resource: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        MigrateError::Serialization(format!("Unexpected response from {resource}: {e}"))
    })
}

fn is_not_found(err: &MigrateError) -> bool {
    err.as_remote().is_some_and(|r| r.is_not_found())
}

fn is_bad_request(err: &MigrateError) -> bool {
    err.as_remote().is_some_and(|r| r.status == 400)
}
