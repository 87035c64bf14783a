//! HTTP client implementation for the chat-completion API
//!
//! This module provides the HTTP client for making requests to an
//! OpenAI-compatible completion endpoint.

use crate::error::{Error, Result};
use reqwest::{Client as ReqwestClient, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, instrument};
use url::Url;

/// Default timeout for HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// HTTP client for making requests to the completion API
#[derive(Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: ReqwestClient,

    /// Base URL for API requests
    base_url: String,

    /// API key for authentication
    api_key: String,
}

#[cfg(test)]
impl HttpClient {
    /// Set the base URL (for testing only)
    pub fn set_base_url(&mut self, url: String) {
        self.base_url = url;
    }
}

impl HttpClient {
    /// Create a new HTTP client with an API key
    pub fn with_api_key(api_key: String) -> Self {
        Self::with_api_key_and_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Create a new HTTP client with an API key and a custom base URL
    pub fn with_api_key_and_base_url(api_key: String, base_url: String) -> Self {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// Build a full URL for an API path
    fn build_url(&self, path: &str) -> Result<Url> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        Url::parse(&url).map_err(|e| Error::Other(format!("Invalid URL: {}", e)))
    }

    /// Send a POST request with a JSON body
    #[instrument(skip(self, body), level = "debug")]
    pub async fn post<T: DeserializeOwned, B: Serialize + std::fmt::Debug>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.build_url(path)?;
        let request = self.client.post(url).bearer_auth(&self.api_key).json(body);

        debug!("Sending POST request to {}", path);
        self.execute_request(request).await
    }

    /// Execute an HTTP request and handle the response
    async fn execute_request<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(Error::Http)?;

        let status = response.status();
        let response_text = response.text().await.map_err(Error::Http)?;

        if status.is_success() {
            serde_json::from_str(&response_text).map_err(|e| {
                error!("Failed to parse response: {}", e);
                Error::UnexpectedResponse(format!("Failed to parse response: {}", e))
            })
        } else {
            error!("API error: {} - {}", status, response_text);

            if status == StatusCode::TOO_MANY_REQUESTS {
                Err(Error::RateLimit {
                    retry_after_secs: 60,
                })
            } else if status == StatusCode::UNAUTHORIZED {
                Err(Error::Auth("Invalid API key or credentials".to_string()))
            } else {
                Err(Error::Api {
                    status_code: status.as_u16(),
                    message: response_text,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct TestResponse {
        message: String,
    }

    #[tokio::test]
    async fn test_post_request_success() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{\"message\": \"success\"}")
            .match_header("authorization", "Bearer test-key")
            .expect(1)
            .create_async()
            .await;

        let mut client = HttpClient::with_api_key("test-key".to_string());
        client.set_base_url(server.url());

        let body = serde_json::json!({"test": "data"});
        let response: TestResponse = client.post("v1/chat/completions", &body).await.unwrap();
        assert_eq!(response.message, "success");

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_error() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/v1/chat/completions")
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let mut client = HttpClient::with_api_key("bad-key".to_string());
        client.set_base_url(server.url());

        let body = serde_json::json!({});
        let result: Result<TestResponse> = client.post("v1/chat/completions", &body).await;
        assert!(matches!(result, Err(Error::Auth(_))));

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_rate_limit_error() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body("slow down")
            .create_async()
            .await;

        let mut client = HttpClient::with_api_key("test-key".to_string());
        client.set_base_url(server.url());

        let body = serde_json::json!({});
        let result: Result<TestResponse> = client.post("v1/chat/completions", &body).await;
        assert!(matches!(result, Err(Error::RateLimit { .. })));

        mock_server.assert_async().await;
    }
}
