use std::sync::Arc;

use tokio::time::sleep;
use tracing::{info, warn};

use super::client::{
    extract_text_from_chat_completions, GenerationBackend, GenerationError, ModelParams,
};
use super::prompt::{build_notice_prompt, fallback_notice};
use crate::config::GenerationConfig;
use crate::report::{DebtReport, NoticeProvider, NoticeResult};

const STATUS_OK: u16 = 200;
const STATUS_RATE_LIMITED: u16 = 429;

/// Builds debt notices through the primary provider with bounded retries,
/// falling back to a local template.
///
/// Contract:
/// - Input: a validated `DebtReport`
/// - Output: a `NoticeResult` with non-empty text, tagged with its provider
/// - Never fails; provider trouble becomes a `Fallback` result
pub struct NoticeComposer {
    backend: Arc<dyn GenerationBackend>,
    cfg: GenerationConfig,
    params: ModelParams,
}

impl NoticeComposer {
    pub fn new(backend: Arc<dyn GenerationBackend>, cfg: GenerationConfig) -> Self {
        let params = ModelParams::from(&cfg);
        Self {
            backend,
            cfg,
            params,
        }
    }

    pub async fn compose(&self, report: &DebtReport) -> NoticeResult {
        let prompt = build_notice_prompt(report);
        let max_attempts = self.cfg.max_retries.max(1);
        let base = self.cfg.base_backoff();

        for attempt in 1..=max_attempts {
            info!(target: "composer", attempt, max_attempts, "Generating notice");
            let has_next = attempt < max_attempts;

            match self
                .backend
                .generate_text(&prompt, self.cfg.request_timeout(), &self.params)
                .await
            {
                Ok(reply) if reply.status == STATUS_OK => {
                    return match extract_text_from_chat_completions(&reply.body)
                        .filter(|t| !t.trim().is_empty())
                    {
                        Some(text) => {
                            info!(target: "composer", attempt, "Notice generated by primary provider");
                            NoticeResult {
                                text: text.trim().to_string(),
                                provider: NoticeProvider::Primary,
                            }
                        }
                        None => {
                            warn!(target: "composer", "Primary provider returned no usable text");
                            self.fallback(report)
                        }
                    };
                }
                Ok(reply) if reply.status == STATUS_RATE_LIMITED => {
                    if has_next {
                        let wait = base * attempt;
                        warn!(target: "composer", attempt, wait_ms = wait.as_millis() as u64, "Rate limited; backing off");
                        sleep(wait).await;
                    } else {
                        warn!(target: "composer", attempt, "Rate limited on final attempt");
                    }
                }
                Ok(reply) => {
                    let snippet: String = reply.body.chars().take(100).collect();
                    warn!(target: "composer", status = reply.status, body = %snippet, "Primary provider error");
                    return self.fallback(report);
                }
                Err(GenerationError::Timeout) => {
                    if has_next {
                        warn!(target: "composer", attempt, wait_ms = base.as_millis() as u64, "Request timed out; retrying");
                        sleep(base).await;
                    } else {
                        warn!(target: "composer", attempt, "Request timed out on final attempt");
                    }
                }
                Err(e) => {
                    warn!(target: "composer", error = %e, "Unexpected generation failure");
                    return self.fallback(report);
                }
            }
        }

        warn!(target: "composer", "All attempts exhausted; using fallback notice");
        self.fallback(report)
    }

    fn fallback(&self, report: &DebtReport) -> NoticeResult {
        NoticeResult {
            text: fallback_notice(report),
            provider: NoticeProvider::Fallback,
        }
    }
}
