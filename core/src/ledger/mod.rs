//! Ledger-recording and asset-minting collaborators
//!
//! Both are consumed by the intake handler through traits; failures come back
//! as `ServiceError` values and are reported to the caller, never raised past it.

mod crossmint;
mod solana;

pub use crossmint::{nft_metadata, CrossmintMinter};
pub use solana::{build_memo_transaction, SolanaMemoRecorder};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::DebtReport;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("not configured: {0}")]
    NotConfigured(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Failed(String),
}

/// Metadata written to the ledger memo and reused for minting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtMemo {
    #[serde(flatten)]
    pub report: DebtReport,
    pub recorded_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
}

impl DebtMemo {
    pub fn new(report: &DebtReport) -> Self {
        Self {
            report: report.clone(),
            recorded_at: Utc::now(),
            kind: "proof_of_debt".to_string(),
            version: "1.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRecord {
    pub transaction_id: String,
    pub explorer_url: String,
    pub memo: DebtMemo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MintedAsset {
    pub asset_id: String,
}

#[async_trait]
pub trait LedgerRecorder: Send + Sync {
    async fn record_on_ledger(&self, report: &DebtReport) -> Result<LedgerRecord, ServiceError>;
}

#[async_trait]
pub trait AssetMinter: Send + Sync {
    async fn mint_asset(
        &self,
        memo: &DebtMemo,
        recipient_wallet: &str,
    ) -> Result<MintedAsset, ServiceError>;
}
