// mlmigrate - Copy and export ML tracking metadata between servers
// Copyright (c) 2025 mlmigrate Contributors
// Licensed under the MIT License

//! # mlmigrate - tracking server copy and export
//!
//! mlmigrate moves ML tracking metadata between tracking servers. It copies
//! registered model versions from one registry to another (including
//! catalog-style registries with three-part model names) and exports
//! experiments with their runs to JSON manifest files.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Copy engine, experiment exporter, artifact path resolution
//! - [`adapters`] - Tracking server REST client, credentials and pagination
//! - [`domain`] - Identifiers, entities and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mlmigrate::adapters::tracking::TrackingClient;
//! use mlmigrate::config::EndpointConfig;
//! use mlmigrate::core::copy::{CopyRequest, ModelVersionCopier};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let src = TrackingClient::new(&EndpointConfig::new("http://localhost:5000", None))?;
//! let dst = TrackingClient::new(&EndpointConfig::new("https://dst.example.com", None))?;
//!
//! let copier = ModelVersionCopier::new(src, dst);
//! let outcome = copier
//!     .copy(&CopyRequest {
//!         src_model: "wine".parse()?,
//!         src_version: "3".parse()?,
//!         dst_model: "main.ml.wine".parse()?,
//!         dst_experiment_name: None,
//!         copy_lineage_tags: true,
//!     })
//!     .await?;
//!
//! println!("Created version {}", outcome.dst_version.version);
//! # Ok(())
//! # }
//! ```
//!
//! ## Exporting an experiment
//!
//! ```rust,no_run
//! use mlmigrate::adapters::tracking::TrackingClient;
//! use mlmigrate::config::EndpointConfig;
//! use mlmigrate::core::export::{
//!     ExperimentExporter, ExportMode, ExportRequest, RunManifestExporter,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TrackingClient::new(&EndpointConfig::new("http://localhost:5000", None))?;
//! let run_exporter = Arc::new(RunManifestExporter::new(client.tracking_uri()));
//! let exporter = ExperimentExporter::new(client, run_exporter);
//!
//! let request = ExportRequest::new("wine", "out/wine")
//!     .with_mode(ExportMode::Threaded { max_workers: 4 });
//! let summary = exporter.export(&request).await?;
//!
//! println!("{} ok, {} failed", summary.num_ok_runs(), summary.num_failed_runs());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`], backed by [`domain::MigrateError`].
//! Only the binary converts into `anyhow::Error`.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
