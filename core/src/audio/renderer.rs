use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use super::markup::clean_text_for_speech;
use super::tts::SpeechBackend;
use crate::config::SpeechConfig;
use crate::report::AudioArtifact;
use crate::{PayGuardError, Result};

const FILE_PREFIX: &str = "audio_update";
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Turns notice text into an audio file on disk, best-effort.
///
/// The speech capability is resolved at construction: a renderer whose config is
/// disabled, or that was built without a backend, returns `None` from `render`
/// without any network call.
pub struct SpeechRenderer {
    cfg: SpeechConfig,
    backend: Option<Arc<dyn SpeechBackend>>,
}

impl SpeechRenderer {
    pub fn new(cfg: SpeechConfig, backend: Option<Arc<dyn SpeechBackend>>) -> Self {
        if cfg.enabled && backend.is_some() {
            info!(target: "speech", voice_id = %cfg.voice_id, model_id = %cfg.model_id, "Speech synthesis enabled");
        } else {
            info!(target: "speech", "Speech synthesis disabled; follow-ups will be text only");
        }
        Self { cfg, backend }
    }

    pub fn is_available(&self) -> bool {
        self.cfg.enabled && self.backend.is_some()
    }

    pub async fn render(&self, text: &str) -> Option<AudioArtifact> {
        let backend = match &self.backend {
            Some(b) if self.cfg.enabled => b,
            _ => {
                debug!(target: "speech", "No synthesis backend configured; skipping audio");
                return None;
            }
        };

        match self.synthesize_to_file(backend.as_ref(), text).await {
            Ok(artifact) => {
                info!(target: "speech", filename = %artifact.filename, "Audio generated");
                Some(artifact)
            }
            Err(e) => {
                warn!(target: "speech", error = %e, "Audio generation failed");
                None
            }
        }
    }

    async fn synthesize_to_file(
        &self,
        backend: &dyn SpeechBackend,
        text: &str,
    ) -> Result<AudioArtifact> {
        let clean = clean_text_for_speech(text);
        if clean.is_empty() {
            return Err(PayGuardError::Speech("nothing to synthesize".into()));
        }
        debug!(target: "speech", chars = clean.len(), "Cleaned text for speech");

        let mut stream = backend
            .synthesize_speech(&clean, &self.cfg.voice_id, &self.cfg.model_id)
            .await?;

        // Buffer the whole stream first so a mid-stream failure leaves no partial file.
        let mut audio = Vec::new();
        while let Some(chunk) = stream.next().await {
            audio.extend_from_slice(&chunk?);
        }
        if audio.is_empty() {
            return Err(PayGuardError::Speech("provider returned no audio".into()));
        }

        let created_at = Utc::now();
        let (filename, path) =
            write_artifact(&self.cfg.audio_dir, &self.cfg.extension, created_at, &audio).await?;
        Ok(AudioArtifact {
            filename,
            path,
            created_at,
        })
    }
}

/// Write `audio` as `audio_update_<YYYYmmdd_HHMMSS>.<ext>`, adding `_<n>` when a
/// file with that name already exists.
pub(crate) async fn write_artifact(
    dir: &Path,
    extension: &str,
    created_at: DateTime<Utc>,
    audio: &[u8],
) -> Result<(String, PathBuf)> {
    fs::create_dir_all(dir).await?;
    let stem = format!("{}_{}", FILE_PREFIX, created_at.format("%Y%m%d_%H%M%S"));

    for n in 0..MAX_NAME_ATTEMPTS {
        let filename = if n == 0 {
            format!("{stem}.{extension}")
        } else {
            format!("{stem}_{n}.{extension}")
        };
        let path = dir.join(&filename);
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        };
        file.write_all(audio).await?;
        file.flush().await?;
        return Ok((filename, path));
    }

    Err(PayGuardError::Speech(format!(
        "no free filename for {stem} after {MAX_NAME_ATTEMPTS} attempts"
    )))
}
