//! # File Hash Registrars
//!
//! Anchor a content identifier in the FileRegistry.
//!
//! | Implementation | Who pays |
//! |----------------|----------|
//! | [`DirectRegistrar`] | the account of the supplied chain client |
//! | [`RelayerRegistrar`] | the relayer's server-held account |
//!
//! Both are idempotent: a CID that `verifyFile` already reports as stored
//! is answered with `already_registered` and no transaction.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use merchfund_chain::{ChainClient, ChainError};
use merchfund_common::cid::{file_hash_hex, is_valid_cid, short_cid};
use merchfund_common::contracts::file_registry::{STORE_FILE_HASH, VERIFY_FILE};
use merchfund_common::relayer_api::{HealthResponse, StoreHashRequest, StoreHashResponse};
use merchfund_common::{Address, Token, TxHash};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};

use crate::records::decode_flag;

/// Registration failure.
#[derive(Debug, Error)]
pub enum RegistrarError {
    #[error("invalid cid '{0}'")]
    InvalidCid(String),

    #[error(transparent)]
    Chain(#[from] ChainError),

    /// Registration transaction confirmed as reverted.
    #[error("registration reverted in {0}")]
    Reverted(TxHash),

    #[error("relayer request failed: {0}")]
    Http(String),

    /// Relayer answered with a non-success status or `success: false`.
    #[error("relayer rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected registry response: {0}")]
    Decode(String),
}

/// Outcome of a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub cid: String,
    /// `0x` + Keccak-256 of the CID text.
    pub file_hash: String,
    pub tx_hash: Option<TxHash>,
    pub already_registered: bool,
}

/// Anchors CIDs on behalf of an owner.
#[async_trait]
pub trait HashRegistrar: Send + Sync {
    async fn register(&self, cid: &str, owner: Address) -> Result<Registration, RegistrarError>;
}

// ════════════════════════════════════════════════════════════════════════════
// DIRECT
// ════════════════════════════════════════════════════════════════════════════

/// Registers through a chain client's own account.
#[derive(Clone)]
pub struct DirectRegistrar {
    chain: Arc<dyn ChainClient>,
    file_registry: Address,
}

impl DirectRegistrar {
    pub fn new(chain: Arc<dyn ChainClient>, file_registry: Address) -> Self {
        Self {
            chain,
            file_registry,
        }
    }

    /// Whether the registry already holds the CID.
    pub async fn is_registered(&self, cid: &str) -> Result<bool, RegistrarError> {
        let out = self
            .chain
            .read(self.file_registry, &VERIFY_FILE, &[Token::String(cid.to_string())])
            .await?;
        decode_flag(out, "verifyFile").map_err(|e| RegistrarError::Decode(e.to_string()))
    }
}

#[async_trait]
impl HashRegistrar for DirectRegistrar {
    async fn register(&self, cid: &str, owner: Address) -> Result<Registration, RegistrarError> {
        if !is_valid_cid(cid) {
            return Err(RegistrarError::InvalidCid(cid.to_string()));
        }
        let file_hash = file_hash_hex(cid);

        if self.is_registered(cid).await? {
            debug!(cid = short_cid(cid), "file hash already registered");
            return Ok(Registration {
                cid: cid.to_string(),
                file_hash,
                tx_hash: None,
                already_registered: true,
            });
        }

        let tx = self
            .chain
            .write(
                self.file_registry,
                &STORE_FILE_HASH,
                &[Token::String(cid.to_string()), Token::Address(owner)],
                0,
            )
            .await?;
        let receipt = self.chain.wait(tx).await?;
        if !receipt.is_success() {
            return Err(RegistrarError::Reverted(tx));
        }

        info!(cid = short_cid(cid), owner = %owner, tx = %tx, "file hash registered");
        Ok(Registration {
            cid: cid.to_string(),
            file_hash,
            tx_hash: Some(tx),
            already_registered: false,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RELAYER
// ════════════════════════════════════════════════════════════════════════════

/// HTTP client for the relayer service.
#[derive(Clone)]
pub struct RelayerRegistrar {
    base: String,
    client: Client,
}

impl RelayerRegistrar {
    pub fn new(base: impl Into<String>) -> Result<Self, RegistrarError> {
        let base = base.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RegistrarError::Http(e.to_string()))?;
        Ok(Self { base, client })
    }

    pub async fn health(&self) -> Result<HealthResponse, RegistrarError> {
        let url = format!("{}/api/health", &self.base);
        let r = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RegistrarError::Http(e.to_string()))?;
        let status = r.status();
        if !status.is_success() {
            let s = r.text().await.unwrap_or_default();
            return Err(RegistrarError::Rejected {
                status: status.as_u16(),
                message: s,
            });
        }
        r.json::<HealthResponse>()
            .await
            .map_err(|e| RegistrarError::Decode(e.to_string()))
    }
}

#[async_trait]
impl HashRegistrar for RelayerRegistrar {
    async fn register(&self, cid: &str, owner: Address) -> Result<Registration, RegistrarError> {
        let url = format!("{}/api/store-hash", &self.base);
        let body = StoreHashRequest {
            cid: cid.to_string(),
            user_address: owner.to_string(),
        };

        let r = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RegistrarError::Http(e.to_string()))?;
        let status = r.status();
        let text = r.text().await.unwrap_or_default();

        let parsed: Option<StoreHashResponse> = serde_json::from_str(&text).ok();
        let resp = match parsed {
            Some(resp) if status.is_success() && resp.success => resp,
            Some(resp) => {
                return Err(RegistrarError::Rejected {
                    status: status.as_u16(),
                    message: resp.error.unwrap_or(text),
                });
            }
            None => {
                return Err(RegistrarError::Rejected {
                    status: status.as_u16(),
                    message: text,
                });
            }
        };

        let tx_hash = resp
            .transaction_hash
            .as_deref()
            .map(str::parse::<TxHash>)
            .transpose()
            .map_err(|e| RegistrarError::Decode(e.to_string()))?;

        debug!(cid = short_cid(cid), already = resp.already_registered, "relayer registered file hash");
        Ok(Registration {
            cid: cid.to_string(),
            file_hash: resp.file_hash.unwrap_or_else(|| file_hash_hex(cid)),
            tx_hash,
            already_registered: resp.already_registered,
        })
    }
}

const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn check() {
        assert_send_sync::<DirectRegistrar>();
        assert_send_sync::<RelayerRegistrar>();
    }
    let _ = check;
};
