//! Raw HTTP command implementation
//!
//! Sends a single authenticated request to the source server and prints the
//! JSON response. Handy for poking at an endpoint with the same credentials
//! the copy and export commands use.

use crate::adapters::tracking::{resolve_endpoint, ApiKind, EndpointRole, HttpClient};
use crate::config::{load_config_or_default, secret_string};
use crate::log_options;
use clap::Args;
use serde_json::Value;

/// Arguments for the http command
#[derive(Args, Debug)]
pub struct HttpArgs {
    /// API family: mlflow (tracking REST API) or platform (workspace REST API)
    #[arg(long, default_value = "mlflow")]
    pub api: String,

    /// Resource path relative to the API base, e.g. `experiments/get`
    #[arg(long)]
    pub resource: String,

    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    #[arg(long, default_value = "GET")]
    pub method: String,

    /// Query parameters as a JSON object (GET)
    #[arg(long)]
    pub params: Option<String>,

    /// Request body as JSON (POST, PUT, PATCH, DELETE)
    #[arg(long)]
    pub data: Option<String>,

    /// Write the response here instead of stdout
    #[arg(long)]
    pub output_file: Option<String>,

    /// Server URL (overrides config and environment)
    #[arg(long)]
    pub host: Option<String>,

    /// Token (overrides config and environment)
    #[arg(long)]
    pub token: Option<String>,
}

impl HttpArgs {
    /// Execute the http command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };
        if let Some(host) = &self.host {
            config.source.host = Some(host.clone());
        }
        if let Some(token) = &self.token {
            config.source.token = Some(secret_string(token.clone()));
        }

        let api: ApiKind = match self.api.parse() {
            Ok(api) => api,
            Err(e) => {
                eprintln!("Configuration error: --api: {e}");
                return Ok(2);
            }
        };
        let method = self.method.to_uppercase();

        let params = match parse_json_arg("--params", self.params.as_deref()) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };
        let data = match parse_json_arg("--data", self.data.as_deref()) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let resource = &self.resource;
        let output_file = &self.output_file;
        log_options!(api, resource, method, params, data, output_file);

        let endpoint = match resolve_endpoint(EndpointRole::Source, &config.source) {
            Ok(e) => e,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };
        let client = HttpClient::new(api, &endpoint)?;

        let response = match method.as_str() {
            "GET" => client.get(resource, params.as_ref()).await?,
            "POST" => client.post(resource, data.as_ref()).await?,
            "PUT" => client.put(resource, data.as_ref()).await?,
            "PATCH" => client.patch(resource, data.as_ref()).await?,
            "DELETE" => client.delete(resource, data.as_ref()).await?,
            other => {
                eprintln!("Configuration error: unsupported method '{other}'");
                return Ok(2);
            }
        };

        let rendered = serde_json::to_string_pretty(&response)?;
        match output_file {
            Some(path) => {
                tokio::fs::write(path, format!("{rendered}\n")).await?;
                tracing::info!(path = %path, "Response written");
            }
            None => println!("{rendered}"),
        }

        Ok(0)
    }
}

fn parse_json_arg(flag: &str, raw: Option<&str>) -> Result<Option<Value>, String> {
    raw.map(|s| serde_json::from_str(s).map_err(|e| format!("{flag} is not valid JSON: {e}")))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use tempfile::TempDir;

    #[test]
    fn test_parse_json_arg() {
        assert_eq!(parse_json_arg("--params", None).unwrap(), None);
        assert_eq!(
            parse_json_arg("--params", Some(r#"{"a": 1}"#)).unwrap(),
            Some(serde_json::json!({"a": 1}))
        );
        let err = parse_json_arg("--data", Some("{oops")).unwrap_err();
        assert!(err.starts_with("--data"));
    }

    #[tokio::test]
    async fn test_get_writes_response_to_file() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/2.0/mlflow/experiments/get")
            .match_query(Matcher::UrlEncoded("experiment_id".into(), "1".into()))
            .with_status(200)
            .with_body(r#"{"experiment": {"experiment_id": "1", "name": "wine"}}"#)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.json");
        let args = HttpArgs {
            api: "mlflow".to_string(),
            resource: "experiments/get".to_string(),
            method: "get".to_string(),
            params: Some(r#"{"experiment_id": "1"}"#.to_string()),
            data: None,
            output_file: Some(output.display().to_string()),
            host: Some(server.url()),
            token: Some("t".to_string()),
        };

        let code = args.execute("nonexistent-mlmigrate.toml").await.unwrap();
        assert_eq!(code, 0);
        mock.assert_async().await;

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["experiment"]["name"], "wine");
    }

    #[tokio::test]
    async fn test_unknown_api_is_a_config_error() {
        let args = HttpArgs {
            api: "graphql".to_string(),
            resource: "x".to_string(),
            method: "GET".to_string(),
            params: None,
            data: None,
            output_file: None,
            host: Some("http://localhost:1".to_string()),
            token: None,
        };
        assert_eq!(args.execute("nonexistent-mlmigrate.toml").await.unwrap(), 2);
    }
}
