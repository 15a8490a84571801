//! # Design Creation Protocol
//!
//! ```text
//! submit ── ok ─────────────────────────────────────────────► resolve id
//!    │
//!    └─ rejected ─► verifyFile(file_cid), verifyFile(preview_cid)
//!                      │
//!                      ├─ register missing CIDs through the registrar
//!                      │
//!                      └─ submit once more ── ok ──► resolve id
//!                                  └── rejected ──► error (translated)
//! ```
//!
//! The usual cause of a rejected `createDesign` is a CID the FileRegistry
//! has not seen yet, typically because an earlier relayer call failed.
//! Registration failures during recovery are logged; the retry decides the
//! outcome.
//!
//! The design id comes from the `DesignCreated` event, else from
//! `designCount() - 1` when the counter grew.

use merchfund_chain::Receipt;
use merchfund_common::cid::{is_valid_cid, short_cid};
use merchfund_common::contracts::design_marketplace::{CREATE_DESIGN, DESIGN_CREATED};
use merchfund_common::contracts::file_registry::VERIFY_FILE;
use merchfund_common::{Amount, CampaignId, DesignId, Token, TxHash};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::{AdapterError, Result};
use crate::marketplace::Marketplace;
use crate::records::decode_flag;

/// Parameters of a new design.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDesign {
    pub campaign_id: CampaignId,
    pub name: String,
    pub price: Amount,
    pub file_cid: String,
    pub preview_cid: String,
}

impl NewDesign {
    /// Distinct CIDs referenced by the design.
    pub fn cids(&self) -> Vec<&str> {
        let mut cids = vec![self.file_cid.as_str()];
        if !self.preview_cid.is_empty() && self.preview_cid != self.file_cid {
            cids.push(self.preview_cid.as_str());
        }
        cids
    }
}

/// Successful design creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesignCreation {
    /// `None` when neither the event nor the counter identified the design.
    pub design_id: Option<DesignId>,
    pub tx_hash: TxHash,
    /// Whether the submission needed the recovery retry.
    pub retried: bool,
    /// CIDs registered during recovery.
    pub registered: Vec<String>,
}

/// Id of the first decodable `DesignCreated` log.
pub fn design_id_from_receipt(receipt: &Receipt) -> Option<DesignId> {
    receipt.logs.iter().find_map(|log| {
        let tokens = DESIGN_CREATED.decode_log(&log.topics, &log.data).ok()?;
        tokens
            .into_iter()
            .next()?
            .into_uint()
            .and_then(|id| DesignId::try_from(id).ok())
    })
}

impl Marketplace {
    /// Create a design, recovering once from missing file registrations.
    pub async fn create_design(&self, new: &NewDesign) -> Result<DesignCreation> {
        for cid in new.cids() {
            if !is_valid_cid(cid) {
                return Err(AdapterError::InvalidInput(format!("invalid cid '{}'", cid)));
            }
        }

        let count_before = self.design_count().await.ok();

        let (receipt, retried, registered) = match self.submit_design(new).await {
            Ok(receipt) => (receipt, false, Vec::new()),
            Err(AdapterError::Rejected(kind)) => {
                warn!(reason = %kind, "design submission rejected, checking file registrations");
                let registered = self.register_missing(new).await;
                let receipt = self.submit_design(new).await?;
                (receipt, true, registered)
            }
            Err(e) => return Err(e),
        };

        let design_id = match design_id_from_receipt(&receipt) {
            Some(id) => Some(id),
            None => match (count_before, self.design_count().await.ok()) {
                (Some(before), Some(after)) if after > before => Some(after - 1),
                _ => None,
            },
        };

        info!(
            design_id = ?design_id,
            campaign_id = new.campaign_id,
            tx = %receipt.tx_hash,
            retried,
            "design created"
        );
        Ok(DesignCreation {
            design_id,
            tx_hash: receipt.tx_hash,
            retried,
            registered,
        })
    }

    async fn submit_design(&self, new: &NewDesign) -> Result<Receipt> {
        self.submit(
            self.contracts.design_marketplace,
            &CREATE_DESIGN,
            &[
                Token::Uint(u128::from(new.campaign_id)),
                Token::String(new.name.clone()),
                Token::Uint(new.price),
                Token::String(new.file_cid.clone()),
                Token::String(new.preview_cid.clone()),
            ],
            0,
        )
        .await
    }

    /// `verifyFile` for one CID.
    pub async fn is_file_registered(&self, cid: &str) -> Result<bool> {
        let out = self
            .chain
            .read(
                self.contracts.file_registry,
                &VERIFY_FILE,
                &[Token::String(cid.to_string())],
            )
            .await?;
        decode_flag(out, "verifyFile")
    }

    /// Register every referenced CID the registry does not know. Returns
    /// the CIDs that were registered.
    async fn register_missing(&self, new: &NewDesign) -> Vec<String> {
        let owner = match self.require_sender() {
            Ok(owner) => owner,
            Err(e) => {
                warn!(error = %e, "cannot re-register files without an account");
                return Vec::new();
            }
        };

        let mut registered = Vec::new();
        for cid in new.cids() {
            match self.is_file_registered(cid).await {
                Ok(true) => {
                    debug!(cid = short_cid(cid), "file already registered");
                    continue;
                }
                Ok(false) => {}
                Err(e) => debug!(cid = short_cid(cid), error = %e, "verifyFile failed, registering anyway"),
            }

            match self.registrar.register(cid, owner).await {
                Ok(reg) => {
                    if !reg.already_registered {
                        registered.push(cid.to_string());
                    }
                }
                Err(e) => warn!(cid = short_cid(cid), error = %e, "file registration failed"),
            }
        }
        registered
    }
}
