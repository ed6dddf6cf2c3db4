//! Tracking server adapter
//!
//! - [`http`]: authenticated JSON transport with error mapping
//! - [`credentials`]: endpoint resolution from the process environment
//! - [`client`]: typed experiment, run and model registry calls
//! - [`models`]: wire envelopes
//! - [`pagination`]: lazy search cursors

pub mod client;
pub mod credentials;
pub mod http;
pub mod models;
pub mod pagination;

pub use client::TrackingClient;
pub use credentials::{resolve_endpoint, resolve_endpoint_with, EndpointRole};
pub use http::{ApiKind, HttpClient, USER_AGENT};
pub use models::RunViewType;
pub use pagination::{SearchModelVersionsIterator, SearchRunsIterator};
