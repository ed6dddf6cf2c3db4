//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod copy_model_version;
pub mod export_experiment;
pub mod http;
pub mod init;
pub mod validate;
