use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::report::FollowUpOutcome;

/// Receives every finished follow-up. The submitting caller never sees outcomes.
#[async_trait]
pub trait OutcomeSink: Send + Sync {
    async fn deliver(&self, outcome: FollowUpOutcome);
}

/// Logs outcomes through `tracing`
#[derive(Debug, Default, Clone)]
pub struct TracingSink;

#[async_trait]
impl OutcomeSink for TracingSink {
    async fn deliver(&self, outcome: FollowUpOutcome) {
        info!(
            target: "followup",
            success = outcome.success,
            provider = outcome.notice_provider.as_str(),
            audio = outcome.audio_filename.as_deref().unwrap_or("none"),
            timestamp = %outcome.timestamp.to_rfc3339(),
            "Follow-up complete"
        );
        info!(target: "followup", message = %outcome.text_message, "Generated notice");
    }
}

/// Forwards outcomes over an mpsc channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<FollowUpOutcome>,
}

impl ChannelSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<FollowUpOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl OutcomeSink for ChannelSink {
    async fn deliver(&self, outcome: FollowUpOutcome) {
        if self.tx.send(outcome).is_err() {
            warn!(target: "followup", "Outcome receiver dropped; discarding outcome");
        }
    }
}
