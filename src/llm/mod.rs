//! Chat-completion client module
//!
//! This module provides a small client for an OpenAI-compatible
//! chat-completion API. The client is constructed explicitly and passed
//! into the components that need it; there is no ambient global state.

mod http;
mod types;

pub use http::HttpClient;
pub use types::{
    ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Role, Usage,
};

use crate::error::Result;
use tracing::instrument;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the API base URL
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// API path for chat completions
const COMPLETIONS_PATH: &str = "v1/chat/completions";

/// Client for the chat-completion API
///
/// This is the entry point for issuing completion requests. Missing
/// credentials are represented by the absence of a client (`Option<Client>`)
/// at the call sites, which degrade to fixed fallback strings.
#[derive(Clone)]
pub struct Client {
    http_client: HttpClient,
}

impl Client {
    /// Create a new client with an API key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            http_client: HttpClient::with_api_key(api_key.into()),
        }
    }

    /// Create a new client with an API key and a custom base URL
    pub fn with_api_key_and_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client: HttpClient::with_api_key_and_base_url(api_key.into(), base_url.into()),
        }
    }

    /// Build a client from the environment, if a key is present
    ///
    /// Reads `OPENAI_API_KEY` and, optionally, `OPENAI_BASE_URL`. Returns
    /// `None` when no key is configured so callers can degrade gracefully.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty())?;

        let client = match std::env::var(BASE_URL_ENV) {
            Ok(base_url) if !base_url.is_empty() => {
                Self::with_api_key_and_base_url(api_key, base_url)
            }
            _ => Self::with_api_key(api_key),
        };

        Some(client)
    }

    /// Issue one chat-completion request
    #[instrument(skip(self, request), level = "debug", fields(model = %request.model))]
    pub async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        self.http_client.post(COMPLETIONS_PATH, request).await
    }
}

#[cfg(test)]
impl Client {
    /// Build a client pointed at a test server
    pub fn for_test(base_url: String) -> Self {
        let mut http_client = HttpClient::with_api_key("test-key".to_string());
        http_client.set_base_url(base_url);
        Self { http_client }
    }
}
