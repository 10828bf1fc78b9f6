use crate::config::Config;
use color_eyre::{eyre::eyre, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

/// Per-request options for [`ApiClient::request`]
#[derive(Debug, Clone)]
pub struct RequestConfig {
  pub method: Method,
  pub body: Option<serde_json::Value>,
  pub headers: Vec<(String, String)>,
}

impl Default for RequestConfig {
  fn default() -> Self {
    Self {
      method: Method::GET,
      body: None,
      headers: Vec::new(),
    }
  }
}

impl RequestConfig {
  /// POST with a JSON body
  pub fn post(body: serde_json::Value) -> Self {
    Self {
      method: Method::POST,
      body: Some(body),
      ..Self::default()
    }
  }
}

/// JSON-over-HTTP client bound to a base URL.
///
/// Any non-2xx status is a failure; the status is not interpreted further
/// and nothing is retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(config: &Config) -> Result<Self> {
    let base = Url::parse(&config.api.base_url)
      .map_err(|e| eyre!("Invalid API base URL {}: {}", config.api.base_url, e))?;

    let http = reqwest::Client::builder()
      .timeout(config.request_timeout())
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url: base.as_str().trim_end_matches('/').to_string(),
    })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// Issue a request against `base_url + path` and parse the JSON response as `T`
  pub async fn request<T: DeserializeOwned>(&self, path: &str, config: RequestConfig) -> Result<T> {
    let url = format!("{}{}", self.base_url, path);
    let method = config.method.clone();
    tracing::debug!(%method, %url, "API request");

    let mut request = self
      .http
      .request(config.method, &url)
      .header(CONTENT_TYPE, "application/json");
    for (name, value) in &config.headers {
      request = request.header(name.as_str(), value.as_str());
    }
    if let Some(body) = &config.body {
      request = request.json(body);
    }

    let response = request
      .send()
      .await
      .map_err(|e| eyre!("API request failed: {} {}: {}", method, path, e))?;

    let status = response.status();
    if !status.is_success() {
      tracing::warn!(%method, %url, status = status.as_u16(), "API request failed");
      return Err(eyre!(
        "API request failed: {} {} {}",
        status.as_u16(),
        method,
        path
      ));
    }

    response
      .json::<T>()
      .await
      .map_err(|e| eyre!("Failed to parse response from {} {}: {}", method, path, e))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::test_server;
  use crate::config::ApiConfig;

  fn client_for(base_url: &str) -> ApiClient {
    let config = Config {
      api: ApiConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
      },
      ..Config::default()
    };
    ApiClient::new(&config).unwrap()
  }

  #[test]
  fn test_trailing_slash_is_stripped() {
    assert_eq!(
      client_for("http://localhost:8000/").base_url(),
      "http://localhost:8000"
    );
    assert_eq!(
      client_for("http://localhost:8000/api/v1/").base_url(),
      "http://localhost:8000/api/v1"
    );
  }

  #[test]
  fn test_invalid_base_url() {
    let config = Config::default().with_api_url(Some("not a url".to_string()));
    assert!(ApiClient::new(&config).is_err());
  }

  #[tokio::test]
  async fn test_get_parses_json() {
    let server = test_server::spawn().await;
    let client = client_for(&server.base_url);

    let value: serde_json::Value = client.request("/items", RequestConfig::default()).await.unwrap();
    assert_eq!(value["total"], 0);
  }

  #[tokio::test]
  async fn test_post_sends_json_body() {
    let server = test_server::spawn().await;
    let client = client_for(&server.base_url);

    let value: serde_json::Value = client
      .request(
        "/items",
        RequestConfig::post(serde_json::json!({ "name": "Posted" })),
      )
      .await
      .unwrap();
    assert_eq!(value["name"], "Posted");
  }

  #[tokio::test]
  async fn test_custom_headers_are_sent() {
    let server = test_server::spawn().await;
    let client = client_for(&server.base_url);

    let value: serde_json::Value = client
      .request(
        "/echo",
        RequestConfig {
          headers: vec![("x-request-id".to_string(), "abc-123".to_string())],
          ..RequestConfig::default()
        },
      )
      .await
      .unwrap();
    assert_eq!(value["x-request-id"], "abc-123");
    assert_eq!(value["content-type"], "application/json");
  }

  #[tokio::test]
  async fn test_non_success_status_is_an_error() {
    let server = test_server::spawn().await;
    let client = client_for(&server.base_url);

    let err = client
      .request::<serde_json::Value>("/fail", RequestConfig::default())
      .await
      .unwrap_err();
    assert!(err.to_string().contains("API request failed: 500"));
  }

  #[tokio::test]
  async fn test_unreachable_server_is_an_error() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{addr}"));
    let result = client
      .request::<serde_json::Value>("/items", RequestConfig::default())
      .await;
    assert!(result.is_err());
  }
}
