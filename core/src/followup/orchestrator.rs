use chrono::Utc;
use tracing::info;

use crate::audio::SpeechRenderer;
use crate::llm::NoticeComposer;
use crate::report::{DebtReport, FollowUpOutcome};

/// Sequences composer and renderer into a single `FollowUpOutcome`.
///
/// `success` reflects only whether notice text exists; audio is best-effort and
/// never downgrades it.
pub struct FollowUpOrchestrator {
    composer: NoticeComposer,
    renderer: SpeechRenderer,
}

impl FollowUpOrchestrator {
    pub fn new(composer: NoticeComposer, renderer: SpeechRenderer) -> Self {
        Self { composer, renderer }
    }

    pub async fn run_followup(&self, report: &DebtReport) -> FollowUpOutcome {
        info!(target: "followup", employer = %report.employer_name, employee = %report.employee_name, "Starting follow-up");

        let notice = self.composer.compose(report).await;
        let audio = self.renderer.render(&notice.text).await;

        FollowUpOutcome {
            success: !notice.text.is_empty(),
            notice_provider: notice.provider,
            text_message: notice.text,
            audio_filename: audio.map(|a| a.filename),
            timestamp: Utc::now(),
        }
    }
}
