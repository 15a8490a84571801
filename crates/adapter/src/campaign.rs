//! # Campaign Creation Protocol
//!
//! ```text
//! Submitting ──► Submitted ──► IdResolution ──► Verifying ──► Verified
//!     │              │              │
//!     │              │              └── no tier yields an id ──► Unresolved
//!     │              └── receipt reverted ──► CampaignCreationFailed
//!     └── simulation revert ──► Rejected(kind)
//! ```
//!
//! ## Id Resolution Tiers
//!
//! Each tier runs only if the previous one produced nothing:
//!
//! 1. **Event**: first `CampaignCreated` log decoded from the receipt.
//! 2. **Counter**: `campaignCount()` re-read; grew past the snapshot means
//!    the id is `count_after - 1`.
//! 3. **Active list**: active ids `>= count_before`, last one; if none,
//!    the last listed active id.
//!
//! Tiers 2 and 3 assume no other creation lands between the snapshot and
//! the re-read. Concurrent creators can observe each other's ids there;
//! the event tier has no such window.
//!
//! ## Verification
//!
//! After `verify_delay` the campaign is read back and must have a non-zero
//! beneficiary. A failed check is logged and reported in
//! [`CampaignCreation::verified`]; it never fails the operation because the
//! transaction has already succeeded.

use merchfund_chain::Receipt;
use merchfund_common::contracts::campaign_registry::{CAMPAIGN_CREATED, CREATE_CAMPAIGN};
use merchfund_common::{Address, Amount, CampaignId, Token, TxHash};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::{AdapterError, Result};
use crate::marketplace::Marketplace;

/// Parameters of a new campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCampaign {
    pub title: String,
    pub description: String,
    pub goal: Amount,
    pub beneficiary: Address,
    pub designer: Option<Address>,
}

/// Which tier produced the campaign id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IdSource {
    Event,
    Counter,
    ActiveList,
}

/// Successful creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignCreation {
    pub campaign_id: CampaignId,
    pub tx_hash: TxHash,
    pub resolved_by: IdSource,
    /// Read-back after the verify delay found the campaign.
    pub verified: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// TIERS (pure)
// ════════════════════════════════════════════════════════════════════════════

/// Tier 1: id of the first decodable `CampaignCreated` log.
pub fn id_from_receipt(receipt: &Receipt) -> Option<CampaignId> {
    receipt.logs.iter().find_map(|log| {
        let tokens = CAMPAIGN_CREATED.decode_log(&log.topics, &log.data).ok()?;
        tokens
            .into_iter()
            .next()?
            .into_uint()
            .and_then(|id| CampaignId::try_from(id).ok())
    })
}

/// Tier 2: counter grew past the snapshot.
pub fn id_from_counter(count_before: u64, count_after: u64) -> Option<CampaignId> {
    (count_after > count_before).then(|| count_after - 1)
}

/// Tier 3: last active id at or above the snapshot, else the last active id.
pub fn id_from_active_list(count_before: u64, active_ids: &[CampaignId]) -> Option<CampaignId> {
    active_ids
        .iter()
        .rev()
        .find(|id| **id >= count_before)
        .or_else(|| active_ids.last())
        .copied()
}

// ════════════════════════════════════════════════════════════════════════════
// STATE MACHINE
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
enum CreationState {
    Submitting,
    Submitted {
        count_before: u64,
        tx_hash: TxHash,
    },
    IdResolution {
        count_before: u64,
        receipt: Receipt,
    },
    Verifying {
        campaign_id: CampaignId,
        tx_hash: TxHash,
        resolved_by: IdSource,
    },
    Verified(CampaignCreation),
    Unresolved {
        tx_hash: TxHash,
    },
}

impl Marketplace {
    /// Create a campaign and resolve its id.
    ///
    /// # Errors
    ///
    /// - `Rejected(kind)`: the submission was rejected (translated revert)
    /// - `CampaignCreationFailed`: the receipt reports a revert
    /// - `CampaignIdUnresolved`: the transaction succeeded but no tier
    ///   produced an id
    pub async fn create_campaign(&self, new: &NewCampaign) -> Result<CampaignCreation> {
        let mut state = CreationState::Submitting;
        loop {
            debug!(state = state_name(&state), "campaign creation");
            state = match state {
                CreationState::Submitting => self.submit_campaign(new).await?,
                CreationState::Submitted {
                    count_before,
                    tx_hash,
                } => {
                    let receipt = self.chain.wait(tx_hash).await?;
                    if !receipt.is_success() {
                        warn!(tx = %tx_hash, "campaign creation reverted");
                        return Err(AdapterError::CampaignCreationFailed { tx_hash });
                    }
                    CreationState::IdResolution {
                        count_before,
                        receipt,
                    }
                }
                CreationState::IdResolution {
                    count_before,
                    receipt,
                } => self.resolve_id(count_before, &receipt).await,
                CreationState::Verifying {
                    campaign_id,
                    tx_hash,
                    resolved_by,
                } => {
                    let verified = self.verify_created(campaign_id).await;
                    CreationState::Verified(CampaignCreation {
                        campaign_id,
                        tx_hash,
                        resolved_by,
                        verified,
                    })
                }
                CreationState::Verified(creation) => {
                    info!(
                        campaign_id = creation.campaign_id,
                        tx = %creation.tx_hash,
                        resolved_by = ?creation.resolved_by,
                        verified = creation.verified,
                        "campaign created"
                    );
                    return Ok(creation);
                }
                CreationState::Unresolved { tx_hash } => {
                    warn!(tx = %tx_hash, "campaign created but id unresolved");
                    return Err(AdapterError::CampaignIdUnresolved { tx_hash });
                }
            };
        }
    }

    async fn submit_campaign(&self, new: &NewCampaign) -> Result<CreationState> {
        let count_before = match self.campaign_count().await {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "campaign counter snapshot failed, assuming 0");
                0
            }
        };

        let args = [
            Token::String(new.title.clone()),
            Token::String(new.description.clone()),
            Token::Uint(new.goal),
            Token::Address(new.beneficiary),
            Token::Address(new.designer.unwrap_or(Address::ZERO)),
        ];
        let tx_hash = self
            .chain
            .write(self.contracts.campaign_registry, &CREATE_CAMPAIGN, &args, 0)
            .await
            .map_err(AdapterError::from_write)?;

        Ok(CreationState::Submitted {
            count_before,
            tx_hash,
        })
    }

    async fn resolve_id(&self, count_before: u64, receipt: &Receipt) -> CreationState {
        let tx_hash = receipt.tx_hash;
        let verifying = |campaign_id, resolved_by| CreationState::Verifying {
            campaign_id,
            tx_hash,
            resolved_by,
        };

        if let Some(id) = id_from_receipt(receipt) {
            return verifying(id, IdSource::Event);
        }

        match self.campaign_count().await {
            Ok(count_after) => {
                if let Some(id) = id_from_counter(count_before, count_after) {
                    return verifying(id, IdSource::Counter);
                }
            }
            Err(e) => debug!(error = %e, "counter re-read failed"),
        }

        match self.active_campaign_ids().await {
            Ok(active) => {
                if let Some(id) = id_from_active_list(count_before, &active) {
                    return verifying(id, IdSource::ActiveList);
                }
            }
            Err(e) => debug!(error = %e, "active campaign list read failed"),
        }

        CreationState::Unresolved { tx_hash }
    }

    async fn verify_created(&self, campaign_id: CampaignId) -> bool {
        tokio::time::sleep(self.config.verify_delay).await;
        match self.read_campaign(campaign_id).await {
            Ok(c) if c.exists() => true,
            Ok(_) => {
                warn!(campaign_id, "created campaign has no beneficiary on read-back");
                false
            }
            Err(e) => {
                warn!(campaign_id, error = %e, "created campaign verification failed");
                false
            }
        }
    }
}

fn state_name(state: &CreationState) -> &'static str {
    match state {
        CreationState::Submitting => "submitting",
        CreationState::Submitted { .. } => "submitted",
        CreationState::IdResolution { .. } => "id_resolution",
        CreationState::Verifying { .. } => "verifying",
        CreationState::Verified(_) => "verified",
        CreationState::Unresolved { .. } => "unresolved",
    }
}
