//! Text-to-Speech synthesis backends
//!
//! `SpeechBackend` hands back a lazy, forward-only stream of audio chunks; the
//! renderer decides how to assemble and persist them.
//!
//! Env overrides (via `SpeechConfig`):
//! - ELEVENLABS_API_KEY, ELEVENLABS_BASE_URL
//! - ELEVENLABS_VOICE_ID, ELEVENLABS_MODEL_ID, ELEVENLABS_TIMEOUT_MS

use crate::config::SpeechConfig;
use crate::{PayGuardError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::pin::Pin;
use std::time::Duration;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

/// Finite sequence of audio chunks in arrival order. Not restartable.
pub type AudioStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send>>;

#[async_trait]
pub trait SpeechBackend: Send + Sync {
    async fn synthesize_speech(
        &self,
        text: &str,
        voice_id: &str,
        model_id: &str,
    ) -> Result<AudioStream>;
}

/// ElevenLabs text-to-speech over HTTP
#[derive(Clone)]
pub struct ElevenLabsBackend {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl ElevenLabsBackend {
    /// Returns `None` when no API key is configured.
    pub fn new(cfg: &SpeechConfig) -> Result<Option<Self>> {
        let Some(api_key) = cfg.api_key.clone() else {
            return Ok(None);
        };
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()
            .map_err(|e| PayGuardError::Http(format!("Failed to build HTTP client: {e}")))?;
        Ok(Some(Self {
            http,
            endpoint: cfg.endpoint.clone(),
            api_key,
        }))
    }
}

#[async_trait]
impl SpeechBackend for ElevenLabsBackend {
    async fn synthesize_speech(
        &self,
        text: &str,
        voice_id: &str,
        model_id: &str,
    ) -> Result<AudioStream> {
        let url = format!(
            "{}/text-to-speech/{}",
            self.endpoint.trim_end_matches('/'),
            voice_id
        );
        debug!(target: "speech", url = %url, model_id, "POST text-to-speech");

        let resp = self
            .http
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("accept", "audio/mpeg")
            .json(&json!({ "text": text, "model_id": model_id }))
            .send()
            .await
            .map_err(|e| PayGuardError::Speech(format!("text-to-speech request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(PayGuardError::Speech(format!(
                "text-to-speech error: status={} body={}",
                status, body
            )));
        }

        let chunks = resp.bytes_stream().map(|chunk| {
            chunk
                .map(|b| b.to_vec())
                .map_err(|e| PayGuardError::Speech(format!("audio stream interrupted: {e}")))
        });
        Ok(Box::pin(chunks))
    }
}
