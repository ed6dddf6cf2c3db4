//! Endpoint resolution at the process boundary
//!
//! Core components only ever see an explicit [`EndpointConfig`]. This module
//! fills in whatever the config file and command line left out from the
//! process environment:
//!
//! 1. `MLFLOW_TRACKING_URI` when it is an `http(s)://` URI (the value
//!    `databricks` defers to the next variable)
//! 2. `DATABRICKS_HOST`
//!
//! Tokens come from `MLFLOW_TRACKING_TOKEN`, then `DATABRICKS_TOKEN`.
//! Destination endpoints consult the `_DST` suffixed variables first and then
//! fall back to the plain ones.

use crate::config::schema::validate_host;
use crate::config::{secret_string_opt, EndpointConfig, EndpointSettings};
use crate::domain::{MigrateError, Result};

/// Which side of a migration an endpoint serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    Source,
    Destination,
}

impl EndpointRole {
    fn suffixes(&self) -> &'static [&'static str] {
        match self {
            EndpointRole::Source => &[""],
            EndpointRole::Destination => &["_DST", ""],
        }
    }
}

impl std::fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointRole::Source => write!(f, "source"),
            EndpointRole::Destination => write!(f, "destination"),
        }
    }
}

/// Resolve an endpoint from settings plus the process environment
pub fn resolve_endpoint(role: EndpointRole, settings: &EndpointSettings) -> Result<EndpointConfig> {
    resolve_endpoint_with(role, settings, |name| std::env::var(name).ok())
}

/// Resolve an endpoint with an injectable variable lookup
///
/// # Errors
///
/// Returns [`MigrateError::AuthConfiguration`] when no host can be found or
/// the host found is not an http(s) URL. A missing token is not an error;
/// unauthenticated servers are common for local tracking.
pub fn resolve_endpoint_with<F>(
    role: EndpointRole,
    settings: &EndpointSettings,
    lookup: F,
) -> Result<EndpointConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let host = settings
        .host
        .clone()
        .filter(|h| !h.trim().is_empty())
        .or_else(|| {
            role.suffixes().iter().find_map(|suffix| {
                var(&format!("MLFLOW_TRACKING_URI{suffix}"))
                    .filter(|uri| is_http_uri(uri))
                    .or_else(|| var(&format!("DATABRICKS_HOST{suffix}")))
            })
        })
        .ok_or_else(|| {
            MigrateError::AuthConfiguration(format!(
                "No {role} tracking server configured. Set the {role} host in the config \
                 file or on the command line, or set MLFLOW_TRACKING_URI / DATABRICKS_HOST"
            ))
        })?;

    validate_host(&host)
        .map_err(|e| MigrateError::AuthConfiguration(format!("{role} host: {e}")))?;

    let token = settings.token.clone().or_else(|| {
        let raw = role.suffixes().iter().find_map(|suffix| {
            var(&format!("MLFLOW_TRACKING_TOKEN{suffix}"))
                .or_else(|| var(&format!("DATABRICKS_TOKEN{suffix}")))
        });
        secret_string_opt(raw)
    });

    if token.is_none() {
        tracing::debug!(role = %role, host = %host, "No token configured, requests are unauthenticated");
    }

    Ok(EndpointConfig::new(host, token).with_timeout_seconds(settings.timeout_seconds))
}

fn is_http_uri(uri: &str) -> bool {
    let lower = uri.to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
