//! Copying every version of a registered model

use super::engine::{CopyRequest, ModelVersionCopier};
use crate::domain::{ModelName, Result, VersionNumber};
use serde::Serialize;

/// One version that was copied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopiedVersion {
    pub src_version: VersionNumber,
    pub dst_version: VersionNumber,
    pub alias_failures: usize,
}

/// One version that could not be copied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedVersion {
    pub src_version: VersionNumber,
    pub error: String,
}

/// Per-version outcomes of [`ModelVersionCopier::copy_all_versions`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct CopySummary {
    pub ok: Vec<CopiedVersion>,
    pub failed: Vec<FailedVersion>,
}

impl CopySummary {
    pub fn total(&self) -> usize {
        self.ok.len() + self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

impl ModelVersionCopier {
    /// Copy every version of `src_model`, oldest first
    ///
    /// A version that fails (including [`crate::domain::MigrateError::SourceNotFound`])
    /// is recorded and the batch continues. Only a failure to list the
    /// source versions aborts.
    pub async fn copy_all_versions(
        &self,
        src_model: &ModelName,
        dst_model: &ModelName,
        dst_experiment_name: Option<&str>,
        copy_lineage_tags: bool,
    ) -> Result<CopySummary> {
        let mut versions: Vec<VersionNumber> = Vec::new();
        let mut cursor = self.source().search_model_versions(src_model);
        while let Some(version) = cursor.next().await {
            versions.push(version?.version);
        }
        versions.sort();
        versions.dedup();

        tracing::info!(
            model = %src_model,
            versions = versions.len(),
            "Copying all model versions"
        );

        let mut summary = CopySummary::default();
        for src_version in versions {
            let request = CopyRequest {
                src_model: src_model.clone(),
                src_version,
                dst_model: dst_model.clone(),
                dst_experiment_name: dst_experiment_name.map(str::to_string),
                copy_lineage_tags,
            };

            match self.copy(&request).await {
                Ok(outcome) => summary.ok.push(CopiedVersion {
                    src_version,
                    dst_version: outcome.dst_version.version,
                    alias_failures: outcome.alias_failures.len(),
                }),
                Err(e) => {
                    tracing::error!(
                        model = %src_model,
                        version = %src_version,
                        error = %e,
                        "Failed to copy model version"
                    );
                    summary.failed.push(FailedVersion {
                        src_version,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(summary)
    }
}
