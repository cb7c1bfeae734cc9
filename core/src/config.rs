use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Top-level PayGuard configuration.
///
/// Every section starts from its `Default` (hard defaults + environment), and
/// `PayGuardConfig::load()` overlays an optional TOML file on top. The result is
/// resolved once at startup and handed to each component's constructor.
#[derive(Clone, Debug, Default)]
pub struct PayGuardConfig {
    pub generation: GenerationConfig,
    pub speech: SpeechConfig,
    pub ledger: LedgerConfig,
    pub mint: MintConfig,
    pub server: ServerConfig,
}

/// Primary text-generation provider (OpenAI-compatible chat completions)
#[derive(Clone, Debug)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub request_timeout_ms: u64,
    /// Total attempts, including the first
    pub max_retries: u32,
    pub base_backoff_ms: u64,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// Speech synthesis provider. `enabled` is the capability flag: when false the
/// renderer never touches the network.
#[derive(Clone, Debug)]
pub struct SpeechConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub voice_id: String,
    pub model_id: String,
    pub request_timeout_ms: u64,
    pub audio_dir: PathBuf,
    pub extension: String,
}

#[derive(Clone, Debug)]
pub struct LedgerConfig {
    pub rpc_url: String,
    pub memo_program_id: String,
    /// base58-encoded 64-byte keypair of the paying wallet
    pub payer_secret: Option<String>,
    pub cluster: String,
    pub request_timeout_ms: u64,
}

#[derive(Clone, Debug)]
pub struct MintConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub collection_id: Option<String>,
    pub image_url: String,
    pub recipient_chain: String,
    pub request_timeout_ms: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: env_string("MISTRAL_BASE_URL")
                .unwrap_or_else(|| "https://api.mistral.ai/v1".to_string()),
            api_key: env_string("MISTRAL_API_KEY"),
            model: env_string("MISTRAL_MODEL").unwrap_or_else(|| "mistral-medium".to_string()),
            request_timeout_ms: env_parse("MISTRAL_TIMEOUT_MS").unwrap_or(15_000),
            max_retries: env_parse("MISTRAL_MAX_RETRIES").unwrap_or(3),
            base_backoff_ms: env_parse("MISTRAL_BACKOFF_MS").unwrap_or(2_000),
            max_tokens: 350,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

impl GenerationConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn base_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        let api_key = env_string("ELEVENLABS_API_KEY");
        // Capability resolves to "on" only when a key is present, unless forced.
        let enabled = env_parse::<bool>("PAYGUARD_SPEECH_ENABLED").unwrap_or(api_key.is_some());
        Self {
            enabled,
            endpoint: env_string("ELEVENLABS_BASE_URL")
                .unwrap_or_else(|| "https://api.elevenlabs.io/v1".to_string()),
            api_key,
            voice_id: env_string("ELEVENLABS_VOICE_ID")
                .unwrap_or_else(|| "21m00Tcm4TlvDq8ikWAM".to_string()),
            model_id: env_string("ELEVENLABS_MODEL_ID")
                .unwrap_or_else(|| "eleven_monolingual_v1".to_string()),
            request_timeout_ms: env_parse("ELEVENLABS_TIMEOUT_MS").unwrap_or(30_000),
            audio_dir: env_string("PAYGUARD_AUDIO_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static/audio")),
            extension: "mp3".to_string(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: env_string("SOLANA_RPC_URL")
                .unwrap_or_else(|| "https://api.devnet.solana.com".to_string()),
            memo_program_id: "Memo1UhkJRfHyvLMcVucJwxXeuD728EqVDDwQDxFMNo".to_string(),
            payer_secret: env_string("COMPANY_WALLET_PRIVATE_KEY"),
            cluster: env_string("SOLANA_CLUSTER").unwrap_or_else(|| "devnet".to_string()),
            request_timeout_ms: env_parse("SOLANA_TIMEOUT_MS").unwrap_or(30_000),
        }
    }
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            endpoint: env_string("CROSSMINT_BASE_URL")
                .unwrap_or_else(|| "https://staging.crossmint.com/api/2022-06-09".to_string()),
            api_key: env_string("CROSSMINT_API_KEY"),
            collection_id: env_string("CROSSMINT_COLLECTION_ID"),
            image_url: "https://ipfs.io/ipfs/QmX6z6Q7R8RZ5Z5Z5Z5Z5Z5Z5Z5Z5Z5Z5Z5Z5Z5Z5Z5Z5Z5Z"
                .to_string(),
            recipient_chain: "solana".to_string(),
            request_timeout_ms: env_parse("CROSSMINT_TIMEOUT_MS").unwrap_or(30_000),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: env_string("PAYGUARD_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: env_parse("PAYGUARD_PORT").unwrap_or(5000),
        }
    }
}

impl PayGuardConfig {
    /// Load configuration from a TOML file (path via PAYGUARD_CONFIG or ./payguard.toml),
    /// overlaying values onto env-driven defaults.
    pub fn load() -> Self {
        let path = std::env::var("PAYGUARD_CONFIG").unwrap_or_else(|_| "payguard.toml".into());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> Self {
        let default = Self::default();
        if !path.exists() {
            tracing::info!(target: "config", path = %path.display(), "No TOML config found; using defaults/env");
            return default;
        }
        match fs::read_to_string(path) {
            Ok(s) => match Self::overlay_toml(&s, default.clone()) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!(target: "config", error = %e, "Failed to parse TOML; using defaults");
                    default
                }
            },
            Err(e) => {
                tracing::warn!(target: "config", error = %e, "Failed to read TOML; using defaults");
                default
            }
        }
    }

    /// Apply a TOML document on top of `base`. Absent keys keep their base value.
    pub fn overlay_toml(s: &str, base: Self) -> Result<Self, toml::de::Error> {
        toml::from_str::<PayGuardToml>(s).map(|t| t.overlay(base))
    }
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, Deserialize)]
struct PayGuardToml {
    generation: Option<GenerationToml>,
    speech: Option<SpeechToml>,
    ledger: Option<LedgerToml>,
    mint: Option<MintToml>,
    server: Option<ServerToml>,
}

impl PayGuardToml {
    fn overlay(self, mut base: PayGuardConfig) -> PayGuardConfig {
        if let Some(g) = self.generation {
            g.apply(&mut base.generation);
        }
        if let Some(s) = self.speech {
            s.apply(&mut base.speech);
        }
        if let Some(l) = self.ledger {
            l.apply(&mut base.ledger);
        }
        if let Some(m) = self.mint {
            m.apply(&mut base.mint);
        }
        if let Some(s) = self.server {
            s.apply(&mut base.server);
        }
        base
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GenerationToml {
    endpoint: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    request_timeout_ms: Option<u64>,
    max_retries: Option<u32>,
    base_backoff_ms: Option<u64>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    top_p: Option<f32>,
}

impl GenerationToml {
    fn apply(self, c: &mut GenerationConfig) {
        if let Some(v) = self.endpoint {
            c.endpoint = v;
        }
        if let Some(v) = self.api_key {
            c.api_key = Some(v);
        }
        if let Some(v) = self.model {
            c.model = v;
        }
        if let Some(v) = self.request_timeout_ms {
            c.request_timeout_ms = v;
        }
        if let Some(v) = self.max_retries {
            c.max_retries = v.max(1);
        }
        if let Some(v) = self.base_backoff_ms {
            c.base_backoff_ms = v;
        }
        if let Some(v) = self.max_tokens {
            c.max_tokens = v;
        }
        if let Some(v) = self.temperature {
            c.temperature = v;
        }
        if let Some(v) = self.top_p {
            c.top_p = v;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SpeechToml {
    enabled: Option<bool>,
    endpoint: Option<String>,
    api_key: Option<String>,
    voice_id: Option<String>,
    model_id: Option<String>,
    request_timeout_ms: Option<u64>,
    audio_dir: Option<String>,
    extension: Option<String>,
}

impl SpeechToml {
    fn apply(self, c: &mut SpeechConfig) {
        if let Some(v) = self.api_key {
            c.api_key = Some(v);
        }
        if let Some(v) = self.enabled {
            c.enabled = v;
        }
        if let Some(v) = self.endpoint {
            c.endpoint = v;
        }
        if let Some(v) = self.voice_id {
            c.voice_id = v;
        }
        if let Some(v) = self.model_id {
            c.model_id = v;
        }
        if let Some(v) = self.request_timeout_ms {
            c.request_timeout_ms = v;
        }
        if let Some(v) = self.audio_dir {
            c.audio_dir = PathBuf::from(v);
        }
        if let Some(v) = self.extension {
            c.extension = v.trim_start_matches('.').to_string();
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LedgerToml {
    rpc_url: Option<String>,
    memo_program_id: Option<String>,
    payer_secret: Option<String>,
    cluster: Option<String>,
    request_timeout_ms: Option<u64>,
}

impl LedgerToml {
    fn apply(self, c: &mut LedgerConfig) {
        if let Some(v) = self.rpc_url {
            c.rpc_url = v;
        }
        if let Some(v) = self.memo_program_id {
            c.memo_program_id = v;
        }
        if let Some(v) = self.payer_secret {
            c.payer_secret = Some(v);
        }
        if let Some(v) = self.cluster {
            c.cluster = v;
        }
        if let Some(v) = self.request_timeout_ms {
            c.request_timeout_ms = v;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MintToml {
    endpoint: Option<String>,
    api_key: Option<String>,
    collection_id: Option<String>,
    image_url: Option<String>,
    recipient_chain: Option<String>,
    request_timeout_ms: Option<u64>,
}

impl MintToml {
    fn apply(self, c: &mut MintConfig) {
        if let Some(v) = self.endpoint {
            c.endpoint = v;
        }
        if let Some(v) = self.api_key {
            c.api_key = Some(v);
        }
        if let Some(v) = self.collection_id {
            c.collection_id = Some(v);
        }
        if let Some(v) = self.image_url {
            c.image_url = v;
        }
        if let Some(v) = self.recipient_chain {
            c.recipient_chain = v;
        }
        if let Some(v) = self.request_timeout_ms {
            c.request_timeout_ms = v;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ServerToml {
    host: Option<String>,
    port: Option<u16>,
}

impl ServerToml {
    fn apply(self, c: &mut ServerConfig) {
        if let Some(v) = self.host {
            c.host = v;
        }
        if let Some(v) = self.port {
            c.port = v;
        }
    }
}
