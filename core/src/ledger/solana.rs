//! Solana memo recorder
//!
//! Records a debt by sending a single-instruction legacy transaction that invokes
//! the memo program with the JSON-encoded `DebtMemo` as instruction data.
//! Talks to the cluster over plain JSON-RPC (`getLatestBlockhash`, `sendTransaction`).

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use ed25519_dalek::{Signer, SigningKey};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{DebtMemo, LedgerRecord, LedgerRecorder, ServiceError};
use crate::config::LedgerConfig;
use crate::report::DebtReport;
use crate::{PayGuardError, Result};

pub struct SolanaMemoRecorder {
    http: Client,
    cfg: LedgerConfig,
    payer: Option<SigningKey>,
}

impl SolanaMemoRecorder {
    pub fn new(cfg: LedgerConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()
            .map_err(|e| PayGuardError::Http(format!("Failed to build HTTP client: {e}")))?;

        let payer = match cfg.payer_secret.as_deref() {
            Some(secret) => match decode_signing_key(secret) {
                Ok(k) => {
                    info!(target: "ledger", payer = %bs58::encode(k.verifying_key().as_bytes()).into_string(), "Payer wallet loaded");
                    Some(k)
                }
                Err(e) => {
                    warn!(target: "ledger", error = %e, "Payer wallet secret is invalid; ledger records will fail");
                    None
                }
            },
            None => {
                warn!(target: "ledger", "COMPANY_WALLET_PRIVATE_KEY not set; ledger records will fail");
                None
            }
        };

        Ok(Self { http, cfg, payer })
    }

    async fn rpc(&self, method: &str, params: Value) -> std::result::Result<Value, ServiceError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        debug!(target: "ledger", method, url = %self.cfg.rpc_url, "JSON-RPC call");

        let resp = self
            .http
            .post(&self.cfg.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Rejected { status, body });
        }

        let val: Value = resp
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;
        parse_rpc_result(val)
    }

    fn explorer_url(&self, signature: &str) -> String {
        format!(
            "https://explorer.solana.com/tx/{}?cluster={}",
            signature, self.cfg.cluster
        )
    }
}

#[async_trait]
impl LedgerRecorder for SolanaMemoRecorder {
    async fn record_on_ledger(
        &self,
        report: &DebtReport,
    ) -> std::result::Result<LedgerRecord, ServiceError> {
        let payer = self
            .payer
            .as_ref()
            .ok_or_else(|| ServiceError::NotConfigured("payer wallet".into()))?;
        let program = decode_pubkey(&self.cfg.memo_program_id)
            .map_err(|e| ServiceError::NotConfigured(format!("memo program id: {e}")))?;

        let memo = DebtMemo::new(report);
        let memo_text =
            serde_json::to_string(&memo).map_err(|e| ServiceError::Failed(e.to_string()))?;

        let latest = self
            .rpc("getLatestBlockhash", json!([{"commitment": "finalized"}]))
            .await?;
        let blockhash_b58 = latest
            .get("value")
            .and_then(|v| v.get("blockhash"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| ServiceError::InvalidResponse("missing value.blockhash".into()))?;
        let blockhash = decode_pubkey(blockhash_b58).map_err(ServiceError::InvalidResponse)?;
        debug!(target: "ledger", blockhash = %blockhash_b58, "Latest blockhash");

        let tx = build_memo_transaction(payer, &program, &blockhash, memo_text.as_bytes())?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(tx);

        let sent = self
            .rpc(
                "sendTransaction",
                json!([encoded, {
                    "encoding": "base64",
                    "skipPreflight": false,
                    "preflightCommitment": "confirmed",
                    "maxRetries": 3,
                }]),
            )
            .await?;
        let signature = sent
            .as_str()
            .ok_or_else(|| ServiceError::InvalidResponse("signature is not a string".into()))?
            .to_string();

        info!(target: "ledger", signature = %signature, "Debt recorded on chain");
        Ok(LedgerRecord {
            explorer_url: self.explorer_url(&signature),
            transaction_id: signature,
            memo,
        })
    }
}

fn parse_rpc_result(val: Value) -> std::result::Result<Value, ServiceError> {
    if let Some(err) = val.get("error") {
        return Err(ServiceError::Rpc {
            code: err.get("code").and_then(|c| c.as_i64()).unwrap_or(0),
            message: err
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error")
                .to_string(),
        });
    }
    val.get("result")
        .cloned()
        .ok_or_else(|| ServiceError::InvalidResponse("missing result".into()))
}

/// Accepts a 64-byte keypair (secret || public) or a bare 32-byte secret, base58-encoded.
fn decode_signing_key(secret: &str) -> std::result::Result<SigningKey, String> {
    let bytes = bs58::decode(secret.trim())
        .into_vec()
        .map_err(|e| e.to_string())?;
    match bytes.len() {
        64 => {
            let arr: [u8; 64] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| "bad keypair length".to_string())?;
            SigningKey::from_keypair_bytes(&arr).map_err(|e| e.to_string())
        }
        32 => {
            let arr: [u8; 32] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| "bad secret length".to_string())?;
            Ok(SigningKey::from_bytes(&arr))
        }
        n => Err(format!("expected 32 or 64 bytes, got {n}")),
    }
}

fn decode_pubkey(s: &str) -> std::result::Result<[u8; 32], String> {
    let bytes = bs58::decode(s.trim()).into_vec().map_err(|e| e.to_string())?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| format!("expected 32 bytes, got {}", bytes.len()))
}

fn push_compact_u16(out: &mut Vec<u8>, len: usize) -> std::result::Result<(), ServiceError> {
    let mut v = u16::try_from(len)
        .map_err(|_| ServiceError::Failed(format!("length {len} exceeds u16")))?;
    loop {
        let byte = (v & 0x7f) as u8;
        v >>= 7;
        if v == 0 {
            out.push(byte);
            return Ok(());
        }
        out.push(byte | 0x80);
    }
}

/// Serialize and sign a legacy transaction with one memo instruction.
///
/// Layout: `[sig count][signature][message]`, where the message is
/// header (1 signer, 0 readonly signed, 1 readonly unsigned), account keys
/// `[payer, program]`, recent blockhash, and one instruction with no accounts.
pub fn build_memo_transaction(
    payer: &SigningKey,
    program_id: &[u8; 32],
    recent_blockhash: &[u8; 32],
    memo: &[u8],
) -> std::result::Result<Vec<u8>, ServiceError> {
    let mut message = Vec::with_capacity(3 + 1 + 64 + 32 + 4 + memo.len());
    message.extend_from_slice(&[1, 0, 1]);
    push_compact_u16(&mut message, 2)?;
    message.extend_from_slice(payer.verifying_key().as_bytes());
    message.extend_from_slice(program_id);
    message.extend_from_slice(recent_blockhash);
    push_compact_u16(&mut message, 1)?;
    message.push(1); // program id index
    push_compact_u16(&mut message, 0)?;
    push_compact_u16(&mut message, memo.len())?;
    message.extend_from_slice(memo);

    let signature = payer.sign(&message);

    let mut tx = Vec::with_capacity(1 + 64 + message.len());
    push_compact_u16(&mut tx, 1)?;
    tx.extend_from_slice(&signature.to_bytes());
    tx.extend_from_slice(&message);
    Ok(tx)
}
