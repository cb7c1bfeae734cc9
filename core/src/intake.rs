//! Debt intake: validate, record on the ledger, mint, then hand off the follow-up.
//!
//! The synchronous part runs on the caller's task and produces an
//! `IntakeResponse`; the follow-up is dispatched afterwards and its outcome is
//! never part of the response.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::followup::FollowUpDispatcher;
use crate::ledger::{AssetMinter, LedgerRecorder};
use crate::report::{DebtReportForm, ValidationError};

/// Reported when minting was skipped because the ledger record failed
pub const MINT_NOT_ATTEMPTED: &str = "not attempted: ledger record failed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerOutcome {
    pub success: bool,
    pub transaction_id: Option<String>,
    pub explorer_url: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftOutcome {
    pub minted: bool,
    pub nft_id: Option<String>,
    pub error: Option<String>,
}

/// Structured result for the submitting caller. Ledger and minting are
/// reported independently; a failed mint leaves a successful ledger record intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeResponse {
    pub success: bool,
    pub ledger: LedgerOutcome,
    pub nft: NftOutcome,
    pub followup_scheduled: bool,
}

pub struct IntakeHandler {
    recorder: Arc<dyn LedgerRecorder>,
    minter: Arc<dyn AssetMinter>,
    dispatcher: FollowUpDispatcher,
}

impl IntakeHandler {
    pub fn new(
        recorder: Arc<dyn LedgerRecorder>,
        minter: Arc<dyn AssetMinter>,
        dispatcher: FollowUpDispatcher,
    ) -> Self {
        Self {
            recorder,
            minter,
            dispatcher,
        }
    }

    /// Process one debt report.
    ///
    /// # Errors
    /// Only validation failures are returned as `Err`. Ledger and minting failures
    /// are carried inside the `IntakeResponse`.
    pub async fn handle(&self, form: &DebtReportForm) -> Result<IntakeResponse, ValidationError> {
        let report = form.validate().map_err(|e| {
            warn!(target: "intake", error = %e, "Rejected debt report");
            e
        })?;
        info!(target: "intake", employer = %report.employer_name, employee = %report.employee_name, "Received debt report");

        let record = match self.recorder.record_on_ledger(&report).await {
            Ok(r) => r,
            Err(e) => {
                warn!(target: "intake", error = %e, "Ledger record failed");
                return Ok(IntakeResponse {
                    success: false,
                    ledger: LedgerOutcome {
                        success: false,
                        transaction_id: None,
                        explorer_url: None,
                        error: Some(e.to_string()),
                    },
                    nft: NftOutcome {
                        minted: false,
                        nft_id: None,
                        error: Some(MINT_NOT_ATTEMPTED.to_string()),
                    },
                    followup_scheduled: false,
                });
            }
        };

        let nft = match self
            .minter
            .mint_asset(&record.memo, &report.employee_wallet)
            .await
        {
            Ok(asset) => NftOutcome {
                minted: true,
                nft_id: Some(asset.asset_id),
                error: None,
            },
            Err(e) => {
                warn!(target: "intake", error = %e, "Minting failed; ledger record stands");
                NftOutcome {
                    minted: false,
                    nft_id: None,
                    error: Some(e.to_string()),
                }
            }
        };

        self.dispatcher.dispatch(report);

        Ok(IntakeResponse {
            success: true,
            ledger: LedgerOutcome {
                success: true,
                transaction_id: Some(record.transaction_id),
                explorer_url: Some(record.explorer_url),
                error: None,
            },
            nft,
            followup_scheduled: true,
        })
    }
}
