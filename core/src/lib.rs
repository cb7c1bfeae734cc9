// PayGuard Core Library
// Proof-of-debt recording and follow-up notification workflow

pub mod audio;
pub mod config;
pub mod followup;
pub mod intake;
pub mod ledger;
pub mod llm;
pub mod report;

// Export core types
pub use audio::{clean_text_for_speech, SpeechBackend, SpeechRenderer};
pub use config::PayGuardConfig;
pub use followup::{FollowUpDispatcher, FollowUpOrchestrator, OutcomeSink};
pub use intake::{IntakeHandler, IntakeResponse};
pub use ledger::{AssetMinter, LedgerRecorder, ServiceError};
pub use llm::{GenerationBackend, NoticeComposer};
pub use report::{
    AudioArtifact, DebtReport, DebtReportForm, FollowUpOutcome, NoticeProvider, NoticeResult,
    ValidationError,
};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayGuardError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
pub type Result<T> = std::result::Result<T, PayGuardError>;
