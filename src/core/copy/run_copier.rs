//! Copying a run into a destination experiment

use crate::adapters::tracking::models::{
    CreateRunRequest, LogBatchRequest, UpdateRunRequest, MAX_METRICS_PER_BATCH,
    MAX_PARAMS_PER_BATCH, MAX_TAGS_PER_BATCH,
};
use crate::adapters::tracking::TrackingClient;
use crate::domain::tags::{to_tag_list, Tag, TagMap};
use crate::domain::{Metric, Result, Run, RunId};
use async_trait::async_trait;

/// Recreates a source run in a named destination experiment
///
/// Returns the new destination run, whose `artifact_uri` becomes the root
/// for the copied model version's source.
#[async_trait]
pub trait RunCopier: Send + Sync {
    async fn copy_run(&self, src_run_id: &RunId, dst_experiment_name: &str) -> Result<Run>;
}

/// Metadata-only [`RunCopier`] over the tracking API
///
/// Copies run name, start and end time, status, params, metrics and tags.
/// Artifact bytes are not transferred.
#[derive(Debug, Clone)]
pub struct TrackingRunCopier {
    src: TrackingClient,
    dst: TrackingClient,
}

impl TrackingRunCopier {
    pub fn new(src: TrackingClient, dst: TrackingClient) -> Self {
        Self { src, dst }
    }
}

#[async_trait]
impl RunCopier for TrackingRunCopier {
    async fn copy_run(&self, src_run_id: &RunId, dst_experiment_name: &str) -> Result<Run> {
        let src_run = self.src.get_run(src_run_id).await?;
        let experiment_id = self.dst.get_or_create_experiment(dst_experiment_name).await?;

        let created = self
            .dst
            .create_run(&CreateRunRequest {
                experiment_id: experiment_id.to_string(),
                run_name: src_run.info.run_name.clone(),
                start_time: src_run.info.start_time,
                tags: Vec::new(),
            })
            .await?;
        let dst_run_id = created.info.run_id.clone();

        let tags: TagMap = src_run
            .data
            .tags
            .iter()
            .filter(|(k, _)| is_settable_run_tag(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        for batch in log_batches(
            dst_run_id.as_str(),
            &to_tag_list(&src_run.data.params),
            &src_run.data.metrics,
            &to_tag_list(&tags),
        ) {
            self.dst.log_batch(&batch).await?;
        }

        self.dst
            .update_run(&UpdateRunRequest {
                run_id: dst_run_id.to_string(),
                status: src_run
                    .info
                    .status
                    .clone()
                    .unwrap_or_else(|| "FINISHED".to_string()),
                end_time: src_run.info.end_time,
            })
            .await?;

        tracing::info!(
            src_run_id = %src_run_id,
            dst_run_id = %dst_run_id,
            experiment = dst_experiment_name,
            "Copied run"
        );

        self.dst.get_run(&dst_run_id).await
    }
}

/// Tags the tracking server lets a client write
fn is_settable_run_tag(key: &str) -> bool {
    !key.starts_with("mlflow.databricks.") && key != "mlflow.log-model.history"
}

/// Split run data into `runs/log-batch` payloads within the per-call limits
pub fn log_batches(
    run_id: &str,
    params: &[Tag],
    metrics: &[Metric],
    tags: &[Tag],
) -> Vec<LogBatchRequest> {
    let mut params = params.chunks(MAX_PARAMS_PER_BATCH);
    let mut metrics = metrics.chunks(MAX_METRICS_PER_BATCH);
    let mut tags = tags.chunks(MAX_TAGS_PER_BATCH);
    let mut batches = Vec::new();

    loop {
        let batch = LogBatchRequest {
            run_id: run_id.to_string(),
            params: params.next().map(<[Tag]>::to_vec).unwrap_or_default(),
            metrics: metrics.next().map(<[Metric]>::to_vec).unwrap_or_default(),
            tags: tags.next().map(<[Tag]>::to_vec).unwrap_or_default(),
        };
        if batch.is_empty() {
            break;
        }
        batches.push(batch);
    }

    batches
}
