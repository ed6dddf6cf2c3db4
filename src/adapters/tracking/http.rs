//! Authenticated JSON transport for tracking and platform REST APIs
//!
//! One [`HttpClient`] talks to one API base path on one host. Errors never
//! expose `reqwest` types: non-2xx responses become [`RemoteApiError`] and
//! network failures become [`MigrateError::Connection`]. There is no retry at
//! this layer.

use crate::config::{EndpointConfig, SecretString};
use crate::domain::{MigrateError, RemoteApiError, Result};
use reqwest::{Client, ClientBuilder, Method};
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("mlmigrate/", env!("CARGO_PKG_VERSION"));

/// Which REST API family a client targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKind {
    /// Workspace platform API (`api/2.0`)
    Platform,
    /// Tracking and model registry API (`api/2.0/mlflow`)
    Tracking,
}

impl ApiKind {
    /// Base path appended to the host
    pub fn base_path(&self) -> &'static str {
        match self {
            ApiKind::Platform => "api/2.0",
            ApiKind::Tracking => "api/2.0/mlflow",
        }
    }
}

impl FromStr for ApiKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mlflow" | "tracking" => Ok(ApiKind::Tracking),
            "platform" | "databricks" => Ok(ApiKind::Platform),
            _ => Err(format!("Invalid API '{s}'. Must be one of: mlflow, platform")),
        }
    }
}

impl fmt::Display for ApiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiKind::Platform => write!(f, "platform"),
            ApiKind::Tracking => write!(f, "mlflow"),
        }
    }
}

/// JSON-over-HTTPS client bound to one host and API base path
///
/// Cloning is cheap; the underlying connection pool is shared.
///
/// # Example
///
/// ```no_run
/// use mlmigrate::adapters::tracking::http::{ApiKind, HttpClient};
/// use mlmigrate::config::EndpointConfig;
/// use serde_json::json;
///
/// # async fn example() -> mlmigrate::domain::Result<()> {
/// let endpoint = EndpointConfig::new("http://localhost:5000", None);
/// let client = HttpClient::new(ApiKind::Tracking, &endpoint)?;
/// let rsp = client
///     .get("experiments/get", Some(&json!({"experiment_id": "0"})))
///     .await?;
/// println!("{rsp}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    host: String,
    api_uri: String,
    token: Option<SecretString>,
    timeout_seconds: u64,
}

impl HttpClient {
    /// Build a client for the given API family
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::AuthConfiguration`] when the endpoint has no
    /// host, and [`MigrateError::Connection`] if the HTTP client cannot be
    /// built.
    pub fn new(api: ApiKind, endpoint: &EndpointConfig) -> Result<Self> {
        let host = endpoint.host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(MigrateError::AuthConfiguration(
                "tracking server host is not configured".to_string(),
            ));
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(endpoint.timeout_seconds))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MigrateError::Connection(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            host: host.to_string(),
            api_uri: format!("{host}/{}", api.base_path()),
            token: endpoint
                .token
                .clone()
                .filter(|t| !t.expose_secret().is_empty()),
            timeout_seconds: endpoint.timeout_seconds,
        })
    }

    /// Tracking API client (`api/2.0/mlflow`)
    pub fn tracking(endpoint: &EndpointConfig) -> Result<Self> {
        Self::new(ApiKind::Tracking, endpoint)
    }

    /// Platform API client (`api/2.0`)
    pub fn platform(endpoint: &EndpointConfig) -> Result<Self> {
        Self::new(ApiKind::Platform, endpoint)
    }

    /// Server host without trailing slash
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Host joined with the API base path
    pub fn api_uri(&self) -> &str {
        &self.api_uri
    }

    /// GET with `params` encoded as a query string
    pub async fn get(&self, resource: &str, params: Option<&Value>) -> Result<Value> {
        self.send(Method::GET, resource, params, None).await
    }

    /// POST with an optional JSON body
    pub async fn post(&self, resource: &str, body: Option<&Value>) -> Result<Value> {
        self.send(Method::POST, resource, None, body).await
    }

    /// PUT with an optional JSON body
    pub async fn put(&self, resource: &str, body: Option<&Value>) -> Result<Value> {
        self.send(Method::PUT, resource, None, body).await
    }

    /// PATCH with an optional JSON body
    pub async fn patch(&self, resource: &str, body: Option<&Value>) -> Result<Value> {
        self.send(Method::PATCH, resource, None, body).await
    }

    /// DELETE with an optional JSON body
    pub async fn delete(&self, resource: &str, body: Option<&Value>) -> Result<Value> {
        self.send(Method::DELETE, resource, None, body).await
    }

    fn mk_uri(&self, resource: &str) -> String {
        format!("{}/{}", self.api_uri, resource.trim_start_matches('/'))
    }

    async fn send(
        &self,
        method: Method,
        resource: &str,
        params: Option<&Value>,
        body: Option<&Value>,
    ) -> Result<Value> {
        let uri = self.mk_uri(resource);
        tracing::debug!(method = %method, uri = %uri, "Sending request");

        let mut request = self.client.request(method, &uri);
        if let Some(params) = params {
            request = request.query(&query_pairs(params));
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MigrateError::Connection(format!(
                    "Request to {uri} timed out after {}s",
                    self.timeout_seconds
                ))
            } else {
                MigrateError::Connection(format!("Request to {uri} failed: {e}"))
            }
        })?;

        let status = response.status();
        let final_uri = response.url().to_string();
        let text = response.text().await.map_err(|e| {
            MigrateError::Connection(format!("Failed to read response from {uri}: {e}"))
        })?;

        if !status.is_success() {
            let err = RemoteApiError::new(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                final_uri,
            )
            .with_params(params.or(body).cloned())
            .with_body(response_body(&text));
            tracing::debug!(status = err.status, uri = %err.uri, "Request failed");
            return Err(err.into());
        }

        if text.trim().is_empty() {
            return Ok(json!({}));
        }

        serde_json::from_str(&text).map_err(|e| {
            MigrateError::Serialization(format!("Invalid JSON response from {uri}: {e}"))
        })
    }
}

impl fmt::Display for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.api_uri)
    }
}

/// Parsed JSON error body, or the raw text when the body is not JSON
fn response_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Flatten a JSON object into query pairs; arrays repeat the key
fn query_pairs(params: &Value) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    if let Value::Object(map) = params {
        for (key, value) in map {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items {
                        if let Some(v) = scalar_to_string(item) {
                            pairs.push((key.clone(), v));
                        }
                    }
                }
                other => {
                    if let Some(v) = scalar_to_string(other) {
                        pairs.push((key.clone(), v));
                    }
                }
            }
        }
    }
    pairs
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use mockito::Matcher;

    fn endpoint(url: &str, token: Option<&str>) -> EndpointConfig {
        EndpointConfig::new(url, token.map(|t| secret_string(t.to_string())))
    }

    #[test]
    fn test_api_kind_paths() {
        assert_eq!(ApiKind::Platform.base_path(), "api/2.0");
        assert_eq!(ApiKind::Tracking.base_path(), "api/2.0/mlflow");
        assert_eq!("databricks".parse::<ApiKind>().unwrap(), ApiKind::Platform);
        assert_eq!("MLFLOW".parse::<ApiKind>().unwrap(), ApiKind::Tracking);
        assert!("ftp".parse::<ApiKind>().is_err());
    }

    #[test]
    fn test_missing_host_is_auth_error() {
        let result = HttpClient::tracking(&endpoint("", None));
        assert!(matches!(result, Err(MigrateError::AuthConfiguration(_))));
    }

    #[test]
    fn test_query_pairs() {
        let pairs = query_pairs(&json!({
            "name": "wine",
            "version": 3,
            "ids": ["a", "b"],
            "skip": null
        }));
        assert!(pairs.contains(&("name".to_string(), "wine".to_string())));
        assert!(pairs.contains(&("version".to_string(), "3".to_string())));
        assert_eq!(pairs.iter().filter(|(k, _)| k == "ids").count(), 2);
        assert!(!pairs.iter().any(|(k, _)| k == "skip"));
    }

    #[tokio::test]
    async fn test_get_sends_headers_and_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/2.0/mlflow/experiments/get")
            .match_query(Matcher::UrlEncoded("experiment_id".into(), "7".into()))
            .match_header("authorization", "Bearer tok-123")
            .match_header("user-agent", USER_AGENT)
            .with_status(200)
            .with_body(r#"{"experiment": {"experiment_id": "7", "name": "x"}}"#)
            .create_async()
            .await;

        let client = HttpClient::tracking(&endpoint(&server.url(), Some("tok-123"))).unwrap();
        let rsp = client
            .get("experiments/get", Some(&json!({"experiment_id": "7"})))
            .await
            .unwrap();

        assert_eq!(rsp["experiment"]["name"], "x");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_token_sends_no_authorization() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/2.0/clusters/list")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("")
            .create_async()
            .await;

        let client = HttpClient::platform(&endpoint(&server.url(), None)).unwrap();
        let rsp = client.post("clusters/list", None).await.unwrap();

        assert_eq!(rsp, json!({}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_2xx_maps_to_remote_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/2.0/mlflow/registered-models/create")
            .with_status(400)
            .with_body(r#"{"error_code": "RESOURCE_ALREADY_EXISTS", "message": "exists"}"#)
            .create_async()
            .await;

        let client = HttpClient::tracking(&endpoint(&server.url(), None)).unwrap();
        let err = client
            .post("registered-models/create", Some(&json!({"name": "wine"})))
            .await
            .unwrap_err();

        let remote = err.as_remote().expect("remote error");
        assert_eq!(remote.status, 400);
        assert_eq!(remote.reason, "Bad Request");
        assert!(remote.is_already_exists());
        assert_eq!(remote.params, Some(json!({"name": "wine"})));
        assert!(remote.uri.ends_with("/api/2.0/mlflow/registered-models/create"));
    }

    #[tokio::test]
    async fn test_non_json_error_body_kept_as_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/2.0/mlflow/runs/get")
            .match_query(Matcher::Any)
            .with_status(502)
            .with_body("<html>bad gateway</html>")
            .create_async()
            .await;

        let client = HttpClient::tracking(&endpoint(&server.url(), None)).unwrap();
        let err = client
            .get("runs/get", Some(&json!({"run_id": "r"})))
            .await
            .unwrap_err();

        let remote = err.as_remote().expect("remote error");
        assert_eq!(remote.body, Value::String("<html>bad gateway</html>".to_string()));
    }

    #[tokio::test]
    async fn test_connection_failure() {
        let client = HttpClient::tracking(&endpoint("http://127.0.0.1:1", None)).unwrap();
        let err = client.get("experiments/get", None).await.unwrap_err();
        assert!(matches!(err, MigrateError::Connection(_)));
    }
}
