//! Experiment export orchestrator
//!
//! Enumerates an experiment's runs, hands each one to a [`RunExporter`],
//! aggregates outcomes and writes `experiment.json`. A failing run never
//! aborts the export; the manifest is always written.

use super::manifest::{experiment_document, ExportManifest, EXPERIMENT_MANIFEST};
use super::run_exporter::RunExporter;
use super::summary::{ExportSummary, RunOutcomes};
use crate::adapters::tracking::{RunViewType, SearchRunsIterator, TrackingClient};
use crate::adapters::tracking::models::DEFAULT_PAGE_SIZE;
use crate::config::ExportConfig;
use crate::core::timestamp::fmt_ts_millis;
use crate::domain::{Experiment, MigrateError, Result, Run, RunId};
use crate::{log_error_with_context, log_run_skipped};
use futures::FutureExt;
use serde_json::json;
use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Mutex, Semaphore};
use tokio::task::JoinSet;

/// How runs are dispatched to the run exporter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    Sequential,
    /// Bounded worker pool
    Threaded { max_workers: usize },
}

impl ExportMode {
    pub fn from_config(config: &ExportConfig) -> Self {
        if config.use_threads {
            ExportMode::Threaded {
                max_workers: config.max_workers.max(1),
            }
        } else {
            ExportMode::Sequential
        }
    }
}

/// What to export
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// Experiment id or name
    pub experiment: String,
    pub output_dir: PathBuf,
    /// Export only these runs instead of searching the experiment
    pub run_ids: Option<Vec<RunId>>,
    /// Only export runs started at or after this time (epoch millis)
    pub run_start_time: Option<i64>,
    pub export_deleted_runs: bool,
    pub mode: ExportMode,
    pub page_size: usize,
}

impl ExportRequest {
    pub fn new(experiment: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            experiment: experiment.into(),
            output_dir: output_dir.into(),
            run_ids: None,
            run_start_time: None,
            export_deleted_runs: false,
            mode: ExportMode::Sequential,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_run_ids(mut self, run_ids: Vec<RunId>) -> Self {
        self.run_ids = Some(run_ids).filter(|ids| !ids.is_empty());
        self
    }

    pub fn with_run_start_time(mut self, millis: Option<i64>) -> Self {
        self.run_start_time = millis;
        self
    }

    pub fn with_export_deleted_runs(mut self, export_deleted_runs: bool) -> Self {
        self.export_deleted_runs = export_deleted_runs;
        self
    }

    pub fn with_mode(mut self, mode: ExportMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// `runs/search` filter for the minimum start time
    fn search_filter(&self) -> Option<String> {
        self.run_start_time
            .map(|millis| format!("attributes.start_time >= {millis}"))
    }

    fn view_type(&self) -> RunViewType {
        if self.export_deleted_runs {
            RunViewType::All
        } else {
            RunViewType::ActiveOnly
        }
    }
}

/// Where runs come from
enum RunSource {
    Listed(std::vec::IntoIter<RunId>),
    Search(SearchRunsIterator),
}

enum RunItem {
    Run(Run),
    FetchFailed(RunId, MigrateError),
    SearchFailed(MigrateError),
}

impl RunSource {
    async fn next(&mut self, client: &TrackingClient) -> Option<RunItem> {
        match self {
            RunSource::Listed(ids) => {
                let id = ids.next()?;
                Some(match client.get_run(&id).await {
                    Ok(run) => RunItem::Run(run),
                    Err(e) => RunItem::FetchFailed(id, e),
                })
            }
            RunSource::Search(cursor) => Some(match cursor.next().await? {
                Ok(run) => RunItem::Run(run),
                Err(e) => RunItem::SearchFailed(e),
            }),
        }
    }
}

/// Shared per-run context handed to workers
#[derive(Clone)]
struct RunTask {
    exporter: Arc<dyn RunExporter>,
    outcomes: Arc<Mutex<RunOutcomes>>,
    output_dir: PathBuf,
    run_start_time: Option<i64>,
}

impl RunTask {
    async fn process(self, run: Run) {
        let run_id = run.id().clone();

        if let Some(min_start) = self.run_start_time {
            if run.info.start_time.map_or(true, |start| start < min_start) {
                log_run_skipped!(
                    run_id,
                    "started before run_start_time",
                    experiment_id = %run.info.experiment_id,
                    start_time = %run.info.start_time.map(fmt_ts_millis).unwrap_or_default(),
                    run_start_time = %fmt_ts_millis(min_start)
                );
                self.outcomes.lock().await.record_skipped(run_id);
                return;
            }
        }

        let run_dir = self.output_dir.join(run_id.as_str());
        let exported = self.exporter.export_run(&run, &run_dir).await;

        let mut outcomes = self.outcomes.lock().await;
        match exported {
            Ok(true) => {
                outcomes.record_ok(run_id);
            }
            Ok(false) => {
                tracing::warn!(run_id = %run_id, "Run was not exported");
                outcomes.record_failed(run_id);
            }
            Err(e) => {
                log_error_with_context!(e, format!("Exporting run {run_id}"));
                outcomes.record_failed(run_id);
            }
        }
    }

    /// [`RunTask::process`], recording the run as failed if the exporter panics
    async fn process_guarded(self, run: Run) {
        let run_id = run.id().clone();
        let outcomes = Arc::clone(&self.outcomes);
        if let Err(panic) = AssertUnwindSafe(self.process(run)).catch_unwind().await {
            tracing::error!(
                run_id = %run_id,
                panic = %panic_message(panic.as_ref()),
                "Run export panicked"
            );
            outcomes.lock().await.record_failed(run_id);
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Exports one experiment at a time
///
/// # Example
///
/// ```no_run
/// use mlmigrate::adapters::tracking::TrackingClient;
/// use mlmigrate::config::EndpointConfig;
/// use mlmigrate::core::export::{ExperimentExporter, ExportMode, ExportRequest, RunManifestExporter};
/// use std::sync::Arc;
///
/// # async fn example() -> mlmigrate::domain::Result<()> {
/// let client = TrackingClient::new(&EndpointConfig::new("http://localhost:5000", None))?;
/// let exporter = ExperimentExporter::new(
///     client.clone(),
///     Arc::new(RunManifestExporter::new(client.tracking_uri())),
/// );
///
/// let request = ExportRequest::new("/Users/me/wine", "out")
///     .with_mode(ExportMode::Threaded { max_workers: 4 });
/// let summary = exporter.export(&request).await?;
/// println!("{} ok, {} failed", summary.num_ok_runs(), summary.num_failed_runs());
/// # Ok(())
/// # }
/// ```
pub struct ExperimentExporter {
    client: TrackingClient,
    run_exporter: Arc<dyn RunExporter>,
    shutdown_signal: Option<watch::Receiver<bool>>,
}

impl ExperimentExporter {
    pub fn new(client: TrackingClient, run_exporter: Arc<dyn RunExporter>) -> Self {
        Self {
            client,
            run_exporter,
            shutdown_signal: None,
        }
    }

    /// Stop dispatching new runs once the signal turns `true`
    pub fn with_shutdown_signal(mut self, shutdown_signal: watch::Receiver<bool>) -> Self {
        self.shutdown_signal = Some(shutdown_signal);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_signal
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or(false)
    }

    pub async fn export(&self, request: &ExportRequest) -> Result<ExportSummary> {
        let started = Instant::now();
        let experiment = self.client.resolve_experiment(&request.experiment).await?;

        tracing::info!(
            experiment_id = %experiment.experiment_id,
            name = %experiment.name,
            experiment_type = experiment.experiment_type().unwrap_or(""),
            lifecycle_stage = %experiment.lifecycle_stage,
            "Exporting experiment"
        );

        tokio::fs::create_dir_all(&request.output_dir).await?;

        let mut source = match &request.run_ids {
            Some(ids) => {
                let mut seen = HashSet::new();
                let unique: Vec<RunId> = ids
                    .iter()
                    .filter(|id| seen.insert((*id).clone()))
                    .cloned()
                    .collect();
                RunSource::Listed(unique.into_iter())
            }
            None => RunSource::Search(self.client.search_runs(
                &experiment.experiment_id,
                request.search_filter(),
                request.view_type(),
                request.page_size,
            )),
        };

        let outcomes = Arc::new(Mutex::new(RunOutcomes::new()));
        let task = RunTask {
            exporter: Arc::clone(&self.run_exporter),
            outcomes: Arc::clone(&outcomes),
            output_dir: request.output_dir.clone(),
            run_start_time: request.run_start_time,
        };

        let (interrupted, search_error) = match request.mode {
            ExportMode::Sequential => self.dispatch_sequential(&mut source, &task).await,
            ExportMode::Threaded { max_workers } => {
                self.dispatch_threaded(&mut source, &task, max_workers).await
            }
        };

        let outcomes = outcomes.lock().await.clone();
        let manifest_path = self
            .write_manifest(&experiment, &outcomes, &request.output_dir)
            .await?;

        let summary = ExportSummary {
            experiment_id: experiment.experiment_id.clone(),
            experiment_name: experiment.name.clone(),
            ok_runs: outcomes.ok().to_vec(),
            failed_runs: outcomes.failed().to_vec(),
            num_skipped_runs: outcomes.skipped().len(),
            manifest_path,
            duration: started.elapsed(),
            interrupted,
            search_error,
        };
        log_summary(&summary);
        Ok(summary)
    }

    async fn dispatch_sequential(
        &self,
        source: &mut RunSource,
        task: &RunTask,
    ) -> (bool, Option<String>) {
        loop {
            if self.is_shutdown_requested() {
                tracing::warn!("Shutdown requested, not dispatching further runs");
                return (true, None);
            }
            match source.next(&self.client).await {
                None => return (false, None),
                Some(RunItem::Run(run)) => task.clone().process_guarded(run).await,
                Some(RunItem::FetchFailed(run_id, e)) => {
                    record_fetch_failure(&task.outcomes, run_id, &e).await;
                }
                Some(RunItem::SearchFailed(e)) => {
                    log_error_with_context!(e, "Searching runs");
                    return (false, Some(e.to_string()));
                }
            }
        }
    }

    /// Bounded worker pool; a run is only fetched once a worker slot is free
    async fn dispatch_threaded(
        &self,
        source: &mut RunSource,
        task: &RunTask,
        max_workers: usize,
    ) -> (bool, Option<String>) {
        let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
        let mut workers = JoinSet::new();
        let mut interrupted = false;
        let mut search_error = None;

        loop {
            if self.is_shutdown_requested() {
                tracing::warn!("Shutdown requested, not dispatching further runs");
                interrupted = true;
                break;
            }

            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };

            match source.next(&self.client).await {
                None => break,
                Some(RunItem::Run(run)) => {
                    let task = task.clone();
                    workers.spawn(async move {
                        let _permit = permit;
                        task.process_guarded(run).await;
                    });
                }
                Some(RunItem::FetchFailed(run_id, e)) => {
                    record_fetch_failure(&task.outcomes, run_id, &e).await;
                }
                Some(RunItem::SearchFailed(e)) => {
                    log_error_with_context!(e, "Searching runs");
                    search_error = Some(e.to_string());
                    break;
                }
            }

            // Reap finished workers so the set does not grow unbounded
            while let Some(joined) = workers.try_join_next() {
                log_join_error(joined);
            }
        }

        while let Some(joined) = workers.join_next().await {
            log_join_error(joined);
        }

        (interrupted, search_error)
    }

    async fn write_manifest(
        &self,
        experiment: &Experiment,
        outcomes: &RunOutcomes,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let summary = json!({
            "experiment": experiment_document(experiment)?,
            "runs": outcomes.ok(),
        });
        ExportManifest::new(summary, self.client.tracking_uri(), outcomes.info())
            .write(output_dir, EXPERIMENT_MANIFEST)
            .await
    }
}

async fn record_fetch_failure(outcomes: &Mutex<RunOutcomes>, run_id: RunId, error: &MigrateError) {
    log_error_with_context!(error, format!("Fetching run {run_id}"));
    outcomes.lock().await.record_failed(run_id);
}

fn log_join_error(joined: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!(error = %e, "Run export task panicked or was cancelled");
    }
}

fn log_summary(summary: &ExportSummary) {
    let experiment = format!(
        "experiment '{}' (ID: {})",
        summary.experiment_name, summary.experiment_id
    );
    if summary.is_empty() {
        tracing::warn!(
            skipped = summary.num_skipped_runs,
            "No runs exported for {experiment}"
        );
    } else if summary.failed_runs.is_empty() {
        tracing::info!(
            ok = summary.num_ok_runs(),
            duration_ms = summary.duration.as_millis() as u64,
            "{} runs successfully exported for {experiment}",
            summary.num_ok_runs()
        );
    } else {
        tracing::warn!(
            ok = summary.num_ok_runs(),
            failed = summary.num_failed_runs(),
            total = summary.num_total_runs(),
            "{}/{} runs failed for {experiment}",
            summary.num_failed_runs(),
            summary.num_total_runs()
        );
    }
}
