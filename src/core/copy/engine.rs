//! Model version copy engine

use super::capabilities::RegistryCapabilities;
use super::lineage::{destination_tags, LineageContext};
use super::run_copier::{RunCopier, TrackingRunCopier};
use crate::adapters::tracking::models::CreateModelVersionRequest;
use crate::adapters::tracking::TrackingClient;
use crate::core::artifacts::resolve_destination_artifact_path;
use crate::domain::tags::to_tag_list;
use crate::domain::{
    AliasReplicationError, MigrateError, ModelName, ModelVersion, RemoteApiError, Result, Run,
    RunId, Stage, VersionNumber,
};
use std::sync::Arc;

/// What to copy and where
#[derive(Debug, Clone)]
pub struct CopyRequest {
    pub src_model: ModelName,
    pub src_version: VersionNumber,
    pub dst_model: ModelName,
    /// Copy the source run into this destination experiment; when `None` the
    /// destination version points at the source run
    pub dst_experiment_name: Option<String>,
    pub copy_lineage_tags: bool,
}

/// Result of a successful copy
#[derive(Debug, Clone)]
pub struct CopyOutcome {
    pub src_version: ModelVersion,
    /// Destination version as re-read after all steps
    pub dst_version: ModelVersion,
    /// Aliases that could not be set; the copy still counts as successful
    pub alias_failures: Vec<AliasReplicationError>,
}

/// Copies a model version from one registry to another
///
/// Steps run strictly in order. Anything up to and including the stage
/// transition aborts the copy; alias replication failures are collected in
/// [`CopyOutcome::alias_failures`]. Nothing on the destination is ever
/// deleted.
pub struct ModelVersionCopier {
    src: TrackingClient,
    dst: TrackingClient,
    run_copier: Arc<dyn RunCopier>,
}

impl ModelVersionCopier {
    /// Copier using [`TrackingRunCopier`] for destination runs
    pub fn new(src: TrackingClient, dst: TrackingClient) -> Self {
        let run_copier = Arc::new(TrackingRunCopier::new(src.clone(), dst.clone()));
        Self {
            src,
            dst,
            run_copier,
        }
    }

    /// Replace the run copier
    pub fn with_run_copier(mut self, run_copier: Arc<dyn RunCopier>) -> Self {
        self.run_copier = run_copier;
        self
    }

    pub fn source(&self) -> &TrackingClient {
        &self.src
    }

    pub async fn copy(&self, request: &CopyRequest) -> Result<CopyOutcome> {
        let src_uri = format!("{}/{}", request.src_model, request.src_version);
        tracing::info!(
            src = %src_uri,
            dst_model = %request.dst_model,
            "Copying model version"
        );

        let dst_caps = RegistryCapabilities::for_model(&request.dst_model);

        if self.dst.create_registered_model(&request.dst_model).await? {
            tracing::info!(model = %request.dst_model, "Created registered model");
        } else {
            tracing::debug!(model = %request.dst_model, "Registered model already exists");
        }

        let src_version = self
            .src
            .get_model_version(&request.src_model, request.src_version)
            .await
            .map_err(|e| match e.as_remote() {
                Some(remote) if remote.is_not_found() => {
                    MigrateError::SourceNotFound(format!("model version '{src_uri}'"))
                }
                _ => e,
            })?;

        let src_run_id = src_version
            .run_id
            .clone()
            .filter(|id| !id.as_str().trim().is_empty())
            .ok_or_else(|| {
                MigrateError::Validation(format!("model version '{src_uri}' has no run id"))
            })?;

        let dst_run = match &request.dst_experiment_name {
            Some(experiment) => self.run_copier.copy_run(&src_run_id, experiment).await?,
            None => self.src.get_run(&src_run_id).await?,
        };

        let relative = resolve_destination_artifact_path(&src_version.source, src_run_id.as_str())?;
        let source = format!(
            "{}/{}",
            dst_run.info.artifact_uri.trim_end_matches('/'),
            relative
        );

        let src_run = if request.copy_lineage_tags {
            Some(self.source_run(&src_run_id, &dst_run).await?)
        } else {
            None
        };
        let tags = destination_tags(
            &LineageContext {
                src_version: &src_version,
                src_run: src_run.as_ref(),
                src_tracking_uri: self.src.tracking_uri(),
                dst_tracking_uri: self.dst.tracking_uri(),
            },
            request.copy_lineage_tags,
            dst_caps,
        );

        let created = self
            .dst
            .create_model_version(&CreateModelVersionRequest {
                name: request.dst_model.to_string(),
                source: source.clone(),
                run_id: Some(dst_run.id().to_string()),
                tags: to_tag_list(&tags),
                description: src_version.description.clone(),
            })
            .await?;
        tracing::debug!(dst = %created.uri(), source = %source, "Created model version");

        if dst_caps.supports_stage_transition() {
            match src_version.current_stage {
                Some(stage) if stage != Stage::None => {
                    self.dst
                        .transition_stage(&created.name, created.version, stage)
                        .await?;
                }
                _ => tracing::debug!(dst = %created.uri(), "Source has no stage, skipping transition"),
            }
        }

        let alias_failures = if dst_caps.supports_aliases() {
            self.replicate_aliases(&src_version.aliases, &created).await
        } else {
            Vec::new()
        };

        let dst_version = self
            .dst
            .get_model_version(&created.name, created.version)
            .await?;

        tracing::info!(
            src = %src_uri,
            dst = %dst_version.uri(),
            alias_failures = alias_failures.len(),
            "Copied model version"
        );

        Ok(CopyOutcome {
            src_version,
            dst_version,
            alias_failures,
        })
    }

    /// Lineage reads workspace tags from the run the source version came from
    async fn source_run(&self, src_run_id: &RunId, dst_run: &Run) -> Result<Run> {
        if dst_run.id() == src_run_id {
            Ok(dst_run.clone())
        } else {
            self.src.get_run(src_run_id).await
        }
    }

    async fn replicate_aliases(
        &self,
        aliases: &[String],
        dst_version: &ModelVersion,
    ) -> Vec<AliasReplicationError> {
        let mut failures = Vec::new();
        for alias in aliases {
            match self
                .dst
                .set_alias(&dst_version.name, alias, dst_version.version)
                .await
            {
                Ok(()) => tracing::debug!(alias = %alias, dst = %dst_version.uri(), "Set alias"),
                Err(MigrateError::RemoteApi(source)) => {
                    tracing::warn!(
                        alias = %alias,
                        dst = %dst_version.uri(),
                        status = source.status,
                        error_code = source.error_code().unwrap_or(""),
                        "Failed to set alias"
                    );
                    failures.push(AliasReplicationError {
                        alias: alias.clone(),
                        source,
                    });
                }
                Err(e) => {
                    tracing::warn!(alias = %alias, dst = %dst_version.uri(), error = %e, "Failed to set alias");
                    failures.push(AliasReplicationError {
                        alias: alias.clone(),
                        source: RemoteApiError::new(0, e.to_string(), dst_version.uri()),
                    });
                }
            }
        }
        failures
    }
}
