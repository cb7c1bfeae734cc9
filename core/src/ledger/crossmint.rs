//! Crossmint "Proof of Debt" NFT minter

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{AssetMinter, DebtMemo, MintedAsset, ServiceError};
use crate::config::MintConfig;
use crate::{PayGuardError, Result};

pub struct CrossmintMinter {
    http: Client,
    cfg: MintConfig,
}

impl CrossmintMinter {
    pub fn new(cfg: MintConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()
            .map_err(|e| PayGuardError::Http(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, cfg })
    }
}

/// NFT metadata describing a recorded debt
pub fn nft_metadata(memo: &DebtMemo, image_url: &str) -> Value {
    let r = &memo.report;
    json!({
        "name": format!("Proof of Debt - {}", r.employer_name),
        "description": format!("Verified debt acknowledgment for {}", r.employee_name),
        "image": image_url,
        "attributes": [
            {"trait_type": "Debt Amount", "value": r.debt_amount},
            {"trait_type": "Due Date", "value": r.due_date_str()},
            {"trait_type": "Employer", "value": r.employer_name},
            {"trait_type": "Employee", "value": r.employee_name},
            {"trait_type": "Recorded On", "value": memo.recorded_at.to_rfc3339()},
        ]
    })
}

#[async_trait]
impl AssetMinter for CrossmintMinter {
    async fn mint_asset(
        &self,
        memo: &DebtMemo,
        recipient_wallet: &str,
    ) -> std::result::Result<MintedAsset, ServiceError> {
        let api_key = self
            .cfg
            .api_key
            .as_deref()
            .ok_or_else(|| ServiceError::NotConfigured("CROSSMINT_API_KEY".into()))?;
        let collection_id = self
            .cfg
            .collection_id
            .as_deref()
            .ok_or_else(|| ServiceError::NotConfigured("CROSSMINT_COLLECTION_ID".into()))?;

        let url = format!(
            "{}/collections/{}/nfts",
            self.cfg.endpoint.trim_end_matches('/'),
            collection_id
        );
        let payload = json!({
            "recipient": format!("{}:{}", self.cfg.recipient_chain, recipient_wallet),
            "metadata": nft_metadata(memo, &self.cfg.image_url),
            "reuploadLinkedFiles": true,
        });

        let resp = self
            .http
            .post(&url)
            .header("X-CLIENT-SECRET", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!(target: "mint", %status, body = %body, "Mint rejected");
            return Err(ServiceError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let asset_id = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("id").and_then(|id| id.as_str()).map(str::to_string))
            .ok_or_else(|| ServiceError::InvalidResponse("missing id in mint response".into()))?;

        info!(target: "mint", asset_id = %asset_id, "Proof of Debt NFT minted");
        Ok(MintedAsset { asset_id })
    }
}
