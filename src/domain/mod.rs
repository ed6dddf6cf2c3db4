//! Domain models and types for mlmigrate.
//!
//! Entities here are read-only snapshots of what a tracking server returned.
//! Nothing in the crate mutates a source entity; copies are created as new
//! objects on the destination.
//!
//! # Overview
//!
//! - **Strongly-typed identifiers** ([`ExperimentId`], [`RunId`], [`ModelName`], [`VersionNumber`])
//! - **Entities** ([`Experiment`], [`Run`], [`RegisteredModel`], [`ModelVersion`])
//! - **Tags** ([`TagMap`] and the reserved lineage namespace)
//! - **Error types** ([`MigrateError`], [`RemoteApiError`], [`AliasReplicationError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! ```rust
//! use mlmigrate::domain::{MigrateError, Result};
//!
//! fn example() -> Result<()> {
//!     Err(MigrateError::SourceNotFound("wine/3".to_string()))
//! }
//! ```

pub mod errors;
pub mod experiment;
pub mod ids;
pub mod model;
pub mod result;
pub mod run;
pub mod tags;

// Re-export commonly used types for convenience
pub use errors::{
    AliasReplicationError, MigrateError, RemoteApiError, UnrecognizedArtifactPathError,
};
pub use experiment::{Experiment, LifecycleStage};
pub use ids::{ExperimentId, ModelName, RunId, VersionNumber};
pub use model::{ModelVersion, RegisteredModel, Stage};
pub use result::Result;
pub use run::{Metric, Run, RunData, RunInfo};
pub use tags::{Tag, TagMap};
