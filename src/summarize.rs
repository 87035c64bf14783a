//! Content summarization
//!
//! Sends extracted page text through the completion API with a fixed
//! summarization prompt. Failures never propagate: every failure mode maps
//! to a fixed, human-readable string that takes the place of the summary.

use crate::llm::{ChatCompletionRequest, ChatMessage, Client};
use tracing::{debug, instrument, warn};

/// Returned when no completion client is configured
pub const NOT_INITIALIZED: &str = "OpenAI client not initialized due to missing API key.";

/// Returned for inputs below the minimum length, without a network call
pub const TOO_SHORT: &str = "Content is too short to summarize.";

/// Returned when the completion request fails for any reason
pub const FAILED: &str = "Content summarization failed.";

/// Minimum input length, in characters, worth sending to the model
const MIN_INPUT_LEN: usize = 10;

const SYSTEM_PROMPT: &str = "You are a summarization assistant. Create a clear, informative \
summary of the provided website content, maintaining key information and main points.";

/// Default model for summarization
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Summarizer backed by an optional completion client
#[derive(Clone)]
pub struct Summarizer {
    client: Option<Client>,
    model: String,
}

impl Summarizer {
    /// Create a summarizer with the given client
    pub fn new(client: Option<Client>) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Create a summarizer with a specific model
    pub fn with_model(client: Option<Client>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Create a summarizer with no backing client
    ///
    /// Every call returns the not-initialized literal. Used when no API key
    /// is configured, so crawls still complete.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Condense a text blob
    ///
    /// Precondition checks run in order: missing client, then input too
    /// short. Otherwise one completion request is issued with temperature
    /// 0.3 and a 500-token output budget; any request failure is logged and
    /// substituted with a fixed string.
    #[instrument(skip(self, text), level = "debug", fields(input_len = text.len()))]
    pub async fn summarize(&self, text: &str) -> String {
        let client = match &self.client {
            Some(client) => client,
            None => return NOT_INITIALIZED.to_string(),
        };

        if text.chars().count() < MIN_INPUT_LEN {
            return TOO_SHORT.to_string();
        }

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(text),
            ],
            temperature: Some(0.3),
            max_tokens: Some(500),
        };

        match client.complete(&request).await {
            Ok(response) => {
                debug!("Summarized {} chars", text.len());
                response.text()
            }
            Err(e) => {
                warn!("Summarization request failed: {}", e);
                FAILED.to_string()
            }
        }
    }
}
