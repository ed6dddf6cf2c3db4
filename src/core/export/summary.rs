//! Run outcome aggregation and export summary

use crate::domain::{ExperimentId, RunId};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
enum Bucket {
    Ok,
    Failed,
    Skipped,
}

/// Per-run outcomes of one experiment export
///
/// Each run id lands in exactly one of `ok`, `failed` or `skipped`; a second
/// record for the same id is ignored.
#[derive(Debug, Clone, Default)]
pub struct RunOutcomes {
    ok: Vec<RunId>,
    failed: Vec<RunId>,
    skipped: Vec<RunId>,
    seen: HashSet<RunId>,
}

impl RunOutcomes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful export; returns `false` if the id was already recorded
    pub fn record_ok(&mut self, run_id: RunId) -> bool {
        self.record(run_id, Bucket::Ok)
    }

    pub fn record_failed(&mut self, run_id: RunId) -> bool {
        self.record(run_id, Bucket::Failed)
    }

    pub fn record_skipped(&mut self, run_id: RunId) -> bool {
        self.record(run_id, Bucket::Skipped)
    }

    fn record(&mut self, run_id: RunId, bucket: Bucket) -> bool {
        if !self.seen.insert(run_id.clone()) {
            tracing::debug!(run_id = %run_id, "Run outcome already recorded");
            return false;
        }
        match bucket {
            Bucket::Ok => self.ok.push(run_id),
            Bucket::Failed => self.failed.push(run_id),
            Bucket::Skipped => self.skipped.push(run_id),
        }
        true
    }

    pub fn ok(&self) -> &[RunId] {
        &self.ok
    }

    pub fn failed(&self) -> &[RunId] {
        &self.failed
    }

    pub fn skipped(&self) -> &[RunId] {
        &self.skipped
    }

    /// Runs handed to the run exporter (skipped runs excluded)
    pub fn processed(&self) -> usize {
        self.ok.len() + self.failed.len()
    }

    /// Counters written to the experiment manifest
    pub fn info(&self) -> ExportInfo {
        ExportInfo {
            num_total_runs: self.processed(),
            num_ok_runs: self.ok.len(),
            num_failed_runs: self.failed.len(),
            num_skipped_runs: self.skipped.len(),
            failed_runs: self.failed.clone(),
        }
    }
}

/// `metadata.info` of `experiment.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportInfo {
    pub num_total_runs: usize,
    pub num_ok_runs: usize,
    pub num_failed_runs: usize,
    pub num_skipped_runs: usize,
    pub failed_runs: Vec<RunId>,
}

/// Summary of an experiment export
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub experiment_id: ExperimentId,
    pub experiment_name: String,
    pub ok_runs: Vec<RunId>,
    pub failed_runs: Vec<RunId>,
    pub num_skipped_runs: usize,
    /// Path of the written `experiment.json`
    pub manifest_path: PathBuf,
    pub duration: Duration,
    /// A shutdown signal stopped the export before all runs were dispatched
    pub interrupted: bool,
    /// Run enumeration stopped on a remote error
    pub search_error: Option<String>,
}

impl ExportSummary {
    pub fn num_total_runs(&self) -> usize {
        self.ok_runs.len() + self.failed_runs.len()
    }

    pub fn num_ok_runs(&self) -> usize {
        self.ok_runs.len()
    }

    pub fn num_failed_runs(&self) -> usize {
        self.failed_runs.len()
    }

    /// No run reached the run exporter
    pub fn is_empty(&self) -> bool {
        self.num_total_runs() == 0
    }

    /// Every processed run succeeded and enumeration completed
    pub fn is_complete_success(&self) -> bool {
        self.failed_runs.is_empty() && self.search_error.is_none() && !self.interrupted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> RunId {
        RunId::new(s).unwrap()
    }

    #[test]
    fn test_outcomes_are_disjoint() {
        let mut outcomes = RunOutcomes::new();
        assert!(outcomes.record_ok(id("a")));
        assert!(!outcomes.record_failed(id("a")));
        assert!(outcomes.record_failed(id("b")));
        assert!(outcomes.record_skipped(id("c")));
        assert!(!outcomes.record_ok(id("c")));

        assert_eq!(outcomes.ok(), &[id("a")]);
        assert_eq!(outcomes.failed(), &[id("b")]);
        assert_eq!(outcomes.skipped(), &[id("c")]);
        assert_eq!(outcomes.processed(), 2);
    }

    #[test]
    fn test_info_counts_exclude_skipped() {
        let mut outcomes = RunOutcomes::new();
        outcomes.record_ok(id("a"));
        outcomes.record_failed(id("b"));
        outcomes.record_skipped(id("c"));

        let info = outcomes.info();
        assert_eq!(info.num_total_runs, 2);
        assert_eq!(info.num_ok_runs + info.num_failed_runs, info.num_total_runs);
        assert_eq!(info.num_skipped_runs, 1);
        assert_eq!(info.failed_runs, vec![id("b")]);
    }
}
