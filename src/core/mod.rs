//! Core migration logic for mlmigrate.
//!
//! # Modules
//!
//! - [`artifacts`] - artifact path reconstruction between runs
//! - [`copy`] - model version copy engine
//! - [`export`] - batch experiment export orchestration
//! - [`timestamp`] - epoch millis formatting and parsing
//!
//! # Copy Workflow
//!
//! 1. **Register**: create the destination registered model (existing is fine)
//! 2. **Read**: fetch the source model version
//! 3. **Run**: copy the source run or reuse it in place
//! 4. **Resolve**: rebuild the artifact source under the destination run
//! 5. **Tag**: add lineage tags, sanitize keys for catalog registries
//! 6. **Create**: create the destination version
//! 7. **Stage / alias**: transition stage (classic) and replicate aliases
//!
//! # Example
//!
//! ```rust,no_run
//! use mlmigrate::adapters::tracking::TrackingClient;
//! use mlmigrate::config::EndpointConfig;
//! use mlmigrate::core::copy::{CopyRequest, ModelVersionCopier};
//! use mlmigrate::domain::{ModelName, VersionNumber};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let src = TrackingClient::new(&EndpointConfig::new("https://dev.example.com", None))?;
//! let dst = TrackingClient::new(&EndpointConfig::new("https://prod.example.com", None))?;
//!
//! let copier = ModelVersionCopier::new(src, dst);
//! let outcome = copier
//!     .copy(&CopyRequest {
//!         src_model: ModelName::new("wine")?,
//!         src_version: VersionNumber::new(3)?,
//!         dst_model: ModelName::new("main.ml.wine")?,
//!         dst_experiment_name: None,
//!         copy_lineage_tags: true,
//!     })
//!     .await?;
//!
//! println!("Copied to {}", outcome.dst_version.uri());
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod copy;
pub mod export;
pub mod timestamp;
