//! Cross-server model version copy
//!
//! - [`engine`] - the sequential single-version copy
//! - [`batch`] - all versions of a model, recording per-version failures
//! - [`capabilities`] - classic vs catalog-style registry rules
//! - [`lineage`] - provenance tags
//! - [`run_copier`] - recreating the source run on the destination

pub mod batch;
pub mod capabilities;
pub mod engine;
pub mod lineage;
pub mod run_copier;

pub use batch::{CopiedVersion, CopySummary, FailedVersion};
pub use capabilities::RegistryCapabilities;
pub use engine::{CopyOutcome, CopyRequest, ModelVersionCopier};
pub use run_copier::{RunCopier, TrackingRunCopier};
