//! External system integrations for mlmigrate.
//!
//! - [`tracking`] - tracking server and model registry REST APIs
//!
//! Adapters isolate the HTTP stack: nothing outside this module sees a
//! `reqwest` type, and the core receives explicit endpoints rather than
//! reading the environment itself.
//!
//! ```rust,no_run
//! use mlmigrate::adapters::tracking::{resolve_endpoint, EndpointRole, TrackingClient};
//! use mlmigrate::config::EndpointSettings;
//!
//! # async fn example() -> mlmigrate::domain::Result<()> {
//! let endpoint = resolve_endpoint(EndpointRole::Source, &EndpointSettings::default())?;
//! let client = TrackingClient::new(&endpoint)?;
//! let experiment = client.resolve_experiment("/Users/me/wine").await?;
//! println!("{}", experiment.name);
//! # Ok(())
//! # }
//! ```

pub mod tracking;
