//! Raw generation contract consumed by the composer.
//!
//! The backend reports the HTTP status and body verbatim; deciding what a 429 or
//! a 500 means is the composer's job, not the transport's.

use crate::config::GenerationConfig;
use crate::{PayGuardError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Reply from the generation provider, as received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReply {
    pub status: u16,
    pub body: String,
}

/// Failures that never produced an HTTP status
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),
}

/// Sampling parameters sent with each request
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl From<&GenerationConfig> for ModelParams {
    fn from(cfg: &GenerationConfig) -> Self {
        Self {
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
            top_p: cfg.top_p,
        }
    }
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Submit a single-turn prompt.
    ///
    /// # Errors
    /// `GenerationError::Timeout` if no response arrived within `timeout`,
    /// `GenerationError::Transport` for any other failure before a status was received.
    async fn generate_text(
        &self,
        prompt: &str,
        timeout: Duration,
        params: &ModelParams,
    ) -> std::result::Result<GenerationReply, GenerationError>;
}

/// Mistral (OpenAI-compatible chat completions) backend
#[derive(Clone)]
pub struct MistralBackend {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl MistralBackend {
    pub fn new(cfg: &GenerationConfig) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| PayGuardError::Http(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
            api_key: cfg.api_key.clone(),
        })
    }
}

#[async_trait]
impl GenerationBackend for MistralBackend {
    async fn generate_text(
        &self,
        prompt: &str,
        timeout: Duration,
        params: &ModelParams,
    ) -> std::result::Result<GenerationReply, GenerationError> {
        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));
        debug!(target: "composer", url = %url, model = %params.model, "POST chat completions");

        let mut req = self
            .http
            .post(&url)
            .timeout(timeout)
            .header("content-type", "application/json");
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let body = json!({
            "model": params.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
            "top_p": params.top_p,
        });

        let resp = req.json(&body).send().await.map_err(classify)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(classify)?;
        Ok(GenerationReply { status, body })
    }
}

fn classify(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Transport(err.to_string())
    }
}

/// Pull `choices[0].message.content` out of a chat completions body
pub fn extract_text_from_chat_completions(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    v.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(|s| s.to_string())
}
