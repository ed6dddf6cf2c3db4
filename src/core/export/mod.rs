//! Batch experiment export
//!
//! - [`coordinator`] - enumerates runs and dispatches them sequentially or on
//!   a bounded worker pool
//! - [`run_exporter`] - the single-run export seam
//! - [`summary`] - outcome aggregation
//! - [`manifest`] - `experiment.json` / `run.json` documents

pub mod coordinator;
pub mod manifest;
pub mod run_exporter;
pub mod summary;

pub use coordinator::{ExperimentExporter, ExportMode, ExportRequest};
pub use manifest::{ExportManifest, EXPERIMENT_MANIFEST, RUN_MANIFEST};
pub use run_exporter::{RunExporter, RunManifestExporter};
pub use summary::{ExportInfo, ExportSummary, RunOutcomes};
