//! Shared test doubles for payguard-core integration tests.
//!
//! - `ScriptedGeneration`: replays a fixed list of generation replies and records call times
//! - `StubSpeech`: returns a scripted chunk stream and records submitted text
//! - `StubLedger` / `StubMinter`: canned collaborator results with call counters

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use payguard_core::audio::AudioStream;
use payguard_core::config::{GenerationConfig, SpeechConfig};
use payguard_core::followup::{ChannelSink, FollowUpDispatcher};
use payguard_core::ledger::{DebtMemo, LedgerRecord, MintedAsset, ServiceError};
use payguard_core::llm::{GenerationError, GenerationReply, ModelParams};
use payguard_core::{
    AssetMinter, DebtReport, FollowUpOrchestrator, GenerationBackend, LedgerRecorder,
    NoticeComposer, PayGuardError, SpeechBackend, SpeechRenderer,
};
use serde_json::json;
use tokio::time::Instant;

pub fn acme_report() -> DebtReport {
    DebtReport::new(
        "Acme",
        "Jo",
        "W1",
        500.0,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    )
}

pub fn generation_config() -> GenerationConfig {
    GenerationConfig {
        endpoint: "http://generation.invalid/v1".to_string(),
        api_key: Some("test-key".to_string()),
        model: "mistral-medium".to_string(),
        request_timeout_ms: 15_000,
        max_retries: 3,
        base_backoff_ms: 2_000,
        max_tokens: 350,
        temperature: 0.7,
        top_p: 0.9,
    }
}

pub fn speech_config(audio_dir: &Path, enabled: bool) -> SpeechConfig {
    SpeechConfig {
        enabled,
        endpoint: "http://speech.invalid/v1".to_string(),
        api_key: Some("test-key".to_string()),
        voice_id: "voice-1".to_string(),
        model_id: "model-1".to_string(),
        request_timeout_ms: 30_000,
        audio_dir: audio_dir.to_path_buf(),
        extension: "mp3".to_string(),
    }
}

pub fn ok_reply(text: &str) -> Result<GenerationReply, GenerationError> {
    Ok(GenerationReply {
        status: 200,
        body: json!({"choices": [{"message": {"role": "assistant", "content": text}}]})
            .to_string(),
    })
}

pub fn status_reply(status: u16) -> Result<GenerationReply, GenerationError> {
    Ok(GenerationReply {
        status,
        body: format!("{{\"error\":\"status {status}\"}}"),
    })
}

// =============================================================================
// Generation
// =============================================================================

/// Replays scripted replies in order; once the script runs out every call is a transport error.
pub struct ScriptedGeneration {
    script: Mutex<VecDeque<Result<GenerationReply, GenerationError>>>,
    calls: Mutex<Vec<Instant>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGeneration {
    pub fn new(script: Vec<Result<GenerationReply, GenerationError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Gaps between consecutive calls
    pub fn call_gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls.windows(2).map(|w| w[1] - w[0]).collect()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedGeneration {
    async fn generate_text(
        &self,
        prompt: &str,
        _timeout: Duration,
        _params: &ModelParams,
    ) -> Result<GenerationReply, GenerationError> {
        self.calls.lock().unwrap().push(Instant::now());
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Transport("script exhausted".into())))
    }
}

// =============================================================================
// Speech
// =============================================================================

#[derive(Clone, Debug)]
pub enum Chunk {
    Data(Vec<u8>),
    Fail(String),
}

/// Speech backend returning a scripted chunk stream
pub struct StubSpeech {
    chunks: Vec<Chunk>,
    reject: Option<String>,
    calls: AtomicUsize,
    texts: Mutex<Vec<String>>,
}

impl StubSpeech {
    pub fn streaming(chunks: Vec<Chunk>) -> Arc<Self> {
        Arc::new(Self {
            chunks,
            reject: None,
            calls: AtomicUsize::new(0),
            texts: Mutex::new(Vec::new()),
        })
    }

    pub fn rejecting(message: &str) -> Arc<Self> {
        Arc::new(Self {
            chunks: Vec::new(),
            reject: Some(message.to_string()),
            calls: AtomicUsize::new(0),
            texts: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn submitted_texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechBackend for StubSpeech {
    async fn synthesize_speech(
        &self,
        text: &str,
        _voice_id: &str,
        _model_id: &str,
    ) -> payguard_core::Result<AudioStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.lock().unwrap().push(text.to_string());
        if let Some(msg) = &self.reject {
            return Err(PayGuardError::Speech(msg.clone()));
        }
        let items: Vec<payguard_core::Result<Vec<u8>>> = self
            .chunks
            .iter()
            .map(|c| match c {
                Chunk::Data(d) => Ok(d.clone()),
                Chunk::Fail(m) => Err(PayGuardError::Speech(m.clone())),
            })
            .collect();
        Ok(Box::pin(tokio_stream::iter(items)))
    }
}

// =============================================================================
// Ledger / minting
// =============================================================================

pub struct StubLedger {
    result: Result<String, ServiceError>,
    calls: AtomicUsize,
}

impl StubLedger {
    pub fn succeeding(tx_id: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(tx_id.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(err: ServiceError) -> Arc<Self> {
        Arc::new(Self {
            result: Err(err),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerRecorder for StubLedger {
    async fn record_on_ledger(&self, report: &DebtReport) -> Result<LedgerRecord, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map(|tx| LedgerRecord {
            explorer_url: format!("https://explorer.solana.com/tx/{tx}?cluster=devnet"),
            transaction_id: tx,
            memo: DebtMemo::new(report),
        })
    }
}

pub struct StubMinter {
    result: Result<String, ServiceError>,
    calls: Mutex<Vec<String>>,
}

impl StubMinter {
    pub fn succeeding(asset_id: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(asset_id.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(err: ServiceError) -> Arc<Self> {
        Arc::new(Self {
            result: Err(err),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Recipient wallets passed to `mint_asset`
    pub fn recipients(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetMinter for StubMinter {
    async fn mint_asset(
        &self,
        _memo: &DebtMemo,
        recipient_wallet: &str,
    ) -> Result<MintedAsset, ServiceError> {
        self.calls.lock().unwrap().push(recipient_wallet.to_string());
        self.result
            .clone()
            .map(|asset_id| MintedAsset { asset_id })
    }
}

// =============================================================================
// Wiring
// =============================================================================

pub fn orchestrator(
    generation: Arc<ScriptedGeneration>,
    speech: Option<Arc<StubSpeech>>,
    audio_dir: &Path,
) -> FollowUpOrchestrator {
    let composer = NoticeComposer::new(generation, generation_config());
    let enabled = speech.is_some();
    let backend = speech.map(|s| s as Arc<dyn SpeechBackend>);
    let renderer = SpeechRenderer::new(speech_config(audio_dir, enabled), backend);
    FollowUpOrchestrator::new(composer, renderer)
}

pub fn channel_dispatcher(
    orchestrator: FollowUpOrchestrator,
) -> (
    FollowUpDispatcher,
    tokio::sync::mpsc::UnboundedReceiver<payguard_core::FollowUpOutcome>,
) {
    let (sink, rx) = ChannelSink::channel();
    (
        FollowUpDispatcher::new(Arc::new(orchestrator), Arc::new(sink)),
        rx,
    )
}
