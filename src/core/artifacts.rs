//! Artifact path reconstruction
//!
//! A model version's `source` points into the artifact tree of the run that
//! produced it, e.g.
//!
//! ```text
//! dbfs:/databricks/mlflow-tracking/<experiment>/<run>/artifacts/models/my_model
//! /opt/mlflow_server/mlruns/<experiment>/<run>/artifacts/models/my_model
//! s3://bucket/<experiment>/<run>/artifacts/models/my_model
//! runs:/<run>/models/my_model
//! ```
//!
//! Copying the version to another run needs only the part relative to the
//! run's artifact root (`models/my_model`). Resolution is a pure string
//! transform.

use crate::domain::{Result, UnrecognizedArtifactPathError};
use std::fmt;

const ARTIFACTS_SEGMENT: &str = "artifacts";
const RUNS_SCHEME: &str = "runs:/";

/// Storage convention a source URI follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactLayout {
    /// Workspace-managed tracking store (`.../mlflow-tracking/...`)
    PlatformManaged,
    /// Self-hosted server file store (`.../mlruns/...`)
    LocalTracking,
    /// Any other `<prefix>/<run_id>/artifacts/<path>` location
    ObjectStore,
    /// `runs:/<run_id>/<path>`
    RunsScheme,
}

impl fmt::Display for ArtifactLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactLayout::PlatformManaged => "platform_managed",
            ArtifactLayout::LocalTracking => "local_tracking",
            ArtifactLayout::ObjectStore => "object_store",
            ArtifactLayout::RunsScheme => "runs_scheme",
        };
        write!(f, "{s}")
    }
}

/// A source URI split at its run artifact root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifactPath {
    pub layout: ArtifactLayout,
    /// Path relative to the run's artifact root, without leading or trailing `/`
    pub relative_path: String,
}

/// Relative artifact path to append to a destination run's artifact root
///
/// ```
/// use mlmigrate::core::artifacts::resolve_destination_artifact_path;
///
/// let run_id = "48cf29167ddb4e098da780f0959fb4cf";
/// let source = format!("dbfs:/databricks/mlflow-tracking/4072937019901104/{run_id}/artifacts/models/my_model");
/// assert_eq!(resolve_destination_artifact_path(&source, run_id).unwrap(), "models/my_model");
/// ```
///
/// # Errors
///
/// [`crate::domain::MigrateError::UnrecognizedArtifactPath`] when the URI has
/// no `<run_id>/artifacts/<path>` section. An already relative path is
/// rejected rather than stripped again.
pub fn resolve_destination_artifact_path(source_uri: &str, run_id: &str) -> Result<String> {
    Ok(resolve_artifact_path(source_uri, run_id)?.relative_path)
}

/// Classify and split a source URI
pub fn resolve_artifact_path(
    source_uri: &str,
    run_id: &str,
) -> std::result::Result<ResolvedArtifactPath, UnrecognizedArtifactPathError> {
    let err = |reason: &str| UnrecognizedArtifactPathError {
        uri: source_uri.to_string(),
        run_id: run_id.to_string(),
        reason: reason.to_string(),
    };

    if run_id.trim().is_empty() {
        return Err(err("run id is empty"));
    }

    if let Some(rest) = source_uri.strip_prefix(RUNS_SCHEME) {
        let rest = rest.trim_start_matches('/');
        let (head, tail) = rest.split_once('/').unwrap_or((rest, ""));
        if head != run_id {
            return Err(err("runs:/ URI refers to a different run"));
        }
        let relative = tail.trim_matches('/');
        if relative.is_empty() {
            return Err(err("no artifact path after the run id"));
        }
        return Ok(ResolvedArtifactPath {
            layout: ArtifactLayout::RunsScheme,
            relative_path: relative.to_string(),
        });
    }

    let segments: Vec<&str> = source_uri.split('/').collect();
    let run_positions: Vec<usize> = segments
        .iter()
        .enumerate()
        .filter(|(_, s)| **s == run_id)
        .map(|(i, _)| i)
        .collect();

    if run_positions.is_empty() {
        return Err(err("run id is not a segment of the path"));
    }

    let marker = run_positions
        .iter()
        .find(|&&i| segments.get(i + 1) == Some(&ARTIFACTS_SEGMENT))
        .ok_or_else(|| err("no 'artifacts/' segment after the run id"))?;

    let relative = segments[marker + 2..]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");
    if relative.is_empty() {
        return Err(err("no artifact path after 'artifacts/'"));
    }

    let prefix = segments[..*marker].join("/");
    let layout = if prefix.contains("mlflow-tracking") {
        ArtifactLayout::PlatformManaged
    } else if prefix.split('/').any(|s| s == "mlruns") {
        ArtifactLayout::LocalTracking
    } else {
        ArtifactLayout::ObjectStore
    };

    Ok(ResolvedArtifactPath {
        layout,
        relative_path: relative,
    })
}
