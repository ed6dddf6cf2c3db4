//! Domain error types
//!
//! This module defines the error hierarchy for mlmigrate. All errors are
//! domain-specific and don't expose third-party HTTP client types.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Main mlmigrate error type
///
/// This is the primary error type used throughout the crate. The copy engine
/// treats any of these as fatal to the entity it is processing; the batch
/// orchestrator records them as per-run outcomes instead of propagating them.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No usable endpoint or credential could be resolved
    #[error("Authentication configuration error: {0}")]
    AuthConfiguration(String),

    /// Non-2xx response from a tracking or platform endpoint
    #[error(transparent)]
    RemoteApi(#[from] RemoteApiError),

    /// Referenced entity does not exist on the source endpoint
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    /// Artifact URI doesn't match any known storage layout
    #[error(transparent)]
    UnrecognizedArtifactPath(#[from] UnrecognizedArtifactPathError),

    /// Network/connection errors (connect failures, timeouts)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Export process errors
    #[error("Export error: {0}")]
    Export(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl MigrateError {
    /// Returns the remote API error if this error came from a non-2xx response
    pub fn as_remote(&self) -> Option<&RemoteApiError> {
        match self {
            MigrateError::RemoteApi(e) => Some(e),
            _ => None,
        }
    }
}

/// Error raised for any response status outside 200-299
///
/// Carries enough context to be logged and counted without aborting a batch.
#[derive(Debug, Clone)]
pub struct RemoteApiError {
    /// HTTP status code
    pub status: u16,

    /// Reason phrase for the status code
    pub reason: String,

    /// Request URI
    pub uri: String,

    /// Submitted query parameters or request body
    pub params: Option<Value>,

    /// Parsed JSON response body, or the raw text when it isn't JSON
    pub body: Value,
}

impl RemoteApiError {
    /// Creates a new remote API error
    pub fn new(status: u16, reason: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
            uri: uri.into(),
            params: None,
            body: Value::Null,
        }
    }

    /// Sets the submitted parameters
    pub fn with_params(mut self, params: Option<Value>) -> Self {
        self.params = params;
        self
    }

    /// Sets the response body
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Tracking server error code (e.g. `RESOURCE_DOES_NOT_EXIST`), if present
    pub fn error_code(&self) -> Option<&str> {
        self.body.get("error_code").and_then(Value::as_str)
    }

    /// Tracking server error message, if present
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    /// Whether the response means the entity does not exist
    pub fn is_not_found(&self) -> bool {
        self.status == 404 || self.error_code() == Some("RESOURCE_DOES_NOT_EXIST")
    }

    /// Whether the response means the entity already exists
    pub fn is_already_exists(&self) -> bool {
        self.error_code() == Some("RESOURCE_ALREADY_EXISTS")
            || (self.status == 409 && self.error_code().is_none())
    }
}

impl fmt::Display for RemoteApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Remote API error: {} {} ({})", self.status, self.reason, self.uri)?;
        if let Some(code) = self.error_code() {
            write!(f, " error_code={code}")?;
        }
        match self.message() {
            Some(message) => write!(f, ": {message}"),
            None if !self.body.is_null() => write!(f, ": {}", self.body),
            None => Ok(()),
        }
    }
}

impl std::error::Error for RemoteApiError {}

/// Artifact URI doesn't embed the run ID followed by an `artifacts/` marker
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unrecognized artifact path '{uri}' for run '{run_id}': {reason}")]
pub struct UnrecognizedArtifactPathError {
    /// The artifact URI that failed to resolve
    pub uri: String,

    /// The run ID that was searched for
    pub run_id: String,

    /// Why the URI was rejected
    pub reason: String,
}

/// Alias could not be set on a copied model version
///
/// Non-fatal: the model version is still considered successfully copied.
#[derive(Debug, Clone, Error)]
#[error("Failed to set alias '{alias}': {source}")]
pub struct AliasReplicationError {
    /// Alias that could not be set
    pub alias: String,

    /// Underlying remote error
    #[source]
    pub source: RemoteApiError,
}

// Conversion from std::io::Error
impl From<std::io::Error> for MigrateError {
    fn from(err: std::io::Error) -> Self {
        MigrateError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for MigrateError {
    fn from(err: serde_json::Error) -> Self {
        MigrateError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for MigrateError {
    fn from(err: toml::de::Error) -> Self {
        MigrateError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_migrate_error_display() {
        let err = MigrateError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_remote_api_error_conversion() {
        let remote = RemoteApiError::new(500, "Internal Server Error", "http://h/api");
        let err: MigrateError = remote.into();
        assert!(matches!(err, MigrateError::RemoteApi(_)));
        assert_eq!(err.as_remote().map(|e| e.status), Some(500));
    }

    #[test]
    fn test_remote_api_error_codes() {
        let err = RemoteApiError::new(400, "Bad Request", "http://h/api/2.0/mlflow/x")
            .with_body(json!({"error_code": "RESOURCE_ALREADY_EXISTS", "message": "exists"}));
        assert_eq!(err.error_code(), Some("RESOURCE_ALREADY_EXISTS"));
        assert!(err.is_already_exists());
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("RESOURCE_ALREADY_EXISTS"));
    }

    #[test]
    fn test_remote_api_error_not_found() {
        let by_status = RemoteApiError::new(404, "Not Found", "http://h");
        assert!(by_status.is_not_found());

        let by_code = RemoteApiError::new(400, "Bad Request", "http://h")
            .with_body(json!({"error_code": "RESOURCE_DOES_NOT_EXIST"}));
        assert!(by_code.is_not_found());
    }

    #[test]
    fn test_remote_api_error_raw_text_body() {
        let err = RemoteApiError::new(502, "Bad Gateway", "http://h")
            .with_body(Value::String("upstream down".to_string()));
        assert!(err.error_code().is_none());
        assert!(err.to_string().contains("upstream down"));
    }

    #[test]
    fn test_alias_replication_error_source() {
        use std::error::Error as _;

        let err = AliasReplicationError {
            alias: "champion".to_string(),
            source: RemoteApiError::new(404, "Not Found", "http://h"),
        };
        assert!(err.to_string().contains("champion"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: MigrateError = io_err.into();
        assert!(matches!(err, MigrateError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: MigrateError = json_err.into();
        assert!(matches!(err, MigrateError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: MigrateError = toml_err.into();
        assert!(matches!(err, MigrateError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_migrate_error_implements_std_error() {
        let err = MigrateError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
