//! Completion backend for OpenAI-compatible chat endpoints.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, info};

use xpert_core::{defaults, Completion, CompletionBackend, Error, Result};

use super::status::Rejection;
use super::wire::{ChatRequest, ChatResponse, ErrorBody};

/// System message sent with every prompt.
pub const JSON_SYSTEM_PROMPT: &str = "You are a helpful assistant designed to output JSON.";

/// Endpoint settings.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Base URL, up to and including the API version segment.
    pub base_url: String,
    /// Bearer token; local endpoints usually need none.
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    /// Ask the endpoint for `{"type": "json_object"}` output.
    pub json_mode: bool,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::OPENAI_URL.to_string(),
            api_key: None,
            timeout_seconds: defaults::INFERENCE_TIMEOUT_SECS,
            json_mode: true,
        }
    }
}

impl OpenAIConfig {
    /// Load from environment variables.
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `OPENAI_BASE_URL` | `https://api.openai.com/v1` | API endpoint |
    /// | `OPENAI_API_KEY` | (none) | Bearer token |
    /// | `OPENAI_TIMEOUT` | `300` | Request timeout (seconds) |
    /// | `OPENAI_JSON_MODE` | `true` | Request JSON-object output |
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(base.base_url),
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            timeout_seconds: std::env::var("OPENAI_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(base.timeout_seconds),
            json_mode: std::env::var("OPENAI_JSON_MODE")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(base.json_mode),
        }
    }
}

/// Sends each prompt as one chat completion and returns the raw reply.
pub struct OpenAIBackend {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIBackend {
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            base_url = %config.base_url,
            json_mode = config.json_mode,
            authenticated = config.api_key.is_some(),
            "Initializing OpenAI backend"
        );

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(OpenAIConfig::from_env())
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// POST to `path` under the base URL, with bearer auth if configured.
    fn post(&self, path: &str) -> RequestBuilder {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let request = self.client.post(url);
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAIBackend {
    async fn complete(&self, prompt: &str, model: &str) -> Result<Completion> {
        let start = Instant::now();
        let body = ChatRequest::new(model, JSON_SYSTEM_PROMPT, prompt, self.config.json_mode);

        let response = self
            .post("chat/completions")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Completion request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .map(|b| b.error)
                .unwrap_or_default();
            let rejection = Rejection::classify(status, &detail);
            debug!(
                model,
                %status,
                ?rejection,
                transient = rejection.is_transient(),
                "Completion rejected"
            );
            let message: &str = if detail.message.is_empty() {
                "no error message"
            } else {
                &detail.message
            };
            return Err(rejection.into_error(status, message));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Malformed completion response: {}", e)))?;
        let total_tokens = reply.total_tokens();
        let content = reply
            .into_content()
            .ok_or_else(|| Error::Inference("Completion has no message content".to_string()))?;

        debug!(
            model,
            total_tokens,
            reply_len = content.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Completion received"
        );
        Ok(Completion {
            content,
            total_tokens,
        })
    }
}
