//! # Design Purchases
//!
//! Single purchases and batches. A batch first tries one combined
//! `purchaseDesigns` call and falls back to one `purchaseDesign` per id,
//! strictly sequential and in input order, so settlement order is
//! predictable and the sender's nonces never race.
//!
//! The fallback only runs when the combined purchase certainly did not
//! settle:
//!
//! | Combined outcome                  | Batch result            |
//! |-----------------------------------|-------------------------|
//! | rejected by the node (not sent)   | sequential fallback     |
//! | receipt confirmed reverted        | sequential fallback     |
//! | receipt confirmed successful      | `Combined`              |
//! | sent, receipt unknown (`wait` err) | error, nothing re-sent  |
//! | transport error on submission     | error, nothing re-sent  |

use merchfund_chain::{ChainError, Receipt};
use merchfund_common::contracts::design_marketplace;
use merchfund_common::{Amount, DesignId, Token};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::{AdapterError, Result};
use crate::marketplace::Marketplace;
use crate::records::Design;

/// How a batch settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BatchMode {
    Combined,
    Sequential,
}

/// Result of [`Marketplace::purchase_designs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPurchase {
    pub mode: BatchMode,
    /// One receipt when combined, otherwise one per id in input order.
    pub receipts: Vec<Receipt>,
}

impl Marketplace {
    /// Design must exist, be active, and belong to an active campaign.
    async fn purchasable(&self, id: DesignId) -> Result<Design> {
        let design = self.get_design(id).await?;
        if !design.active {
            return Err(AdapterError::DesignInactive(id));
        }
        self.ensure_campaign_active(design.campaign_id).await?;
        Ok(design)
    }

    /// Buy one design at its listed price.
    pub async fn purchase_design(&self, id: DesignId) -> Result<Receipt> {
        let design = self.purchasable(id).await?;
        let receipt = self
            .submit(
                self.contracts.design_marketplace,
                &design_marketplace::PURCHASE_DESIGN,
                &[Token::Uint(u128::from(id))],
                design.price,
            )
            .await?;
        info!(design_id = id, price = %design.price, tx = %receipt.tx_hash, "design purchased");
        Ok(receipt)
    }

    /// Buy several designs.
    ///
    /// Every design is checked before anything is submitted. An empty list
    /// returns an empty sequential result without touching the chain.
    pub async fn purchase_designs(&self, ids: &[DesignId]) -> Result<BatchPurchase> {
        if ids.is_empty() {
            return Ok(BatchPurchase {
                mode: BatchMode::Sequential,
                receipts: Vec::new(),
            });
        }

        let mut total: Amount = 0;
        for id in ids {
            let design = self.purchasable(*id).await?;
            total = total
                .checked_add(design.price)
                .ok_or_else(|| AdapterError::InvalidInput("batch total overflows".to_string()))?;
        }

        if self.config.combined_batch {
            if let Some(receipt) = self.purchase_combined(ids, total).await? {
                return Ok(BatchPurchase {
                    mode: BatchMode::Combined,
                    receipts: vec![receipt],
                });
            }
        }

        let mut receipts = Vec::with_capacity(ids.len());
        for id in ids {
            receipts.push(self.purchase_design(*id).await?);
        }
        Ok(BatchPurchase {
            mode: BatchMode::Sequential,
            receipts,
        })
    }

    /// `Ok(None)` when the combined purchase provably did not settle and
    /// the batch may be bought item by item.
    async fn purchase_combined(&self, ids: &[DesignId], total: Amount) -> Result<Option<Receipt>> {
        let id_tokens = ids.iter().map(|id| Token::Uint(u128::from(*id))).collect();
        let sent = self
            .chain
            .write(
                self.contracts.design_marketplace,
                &design_marketplace::PURCHASE_DESIGNS,
                &[Token::Array(id_tokens)],
                total,
            )
            .await;

        let tx = match sent {
            Ok(tx) => tx,
            Err(ChainError::Write(revert)) => {
                warn!(
                    count = ids.len(),
                    reason = %revert.message,
                    "combined purchase rejected before sending, buying one by one"
                );
                return Ok(None);
            }
            Err(e) => return Err(AdapterError::from_write(e)),
        };

        // Sent: from here on only a confirmed revert allows a second attempt.
        let receipt = self.chain.wait(tx).await?;
        if !receipt.is_success() {
            warn!(count = ids.len(), tx = %tx, "combined purchase reverted, buying one by one");
            return Ok(None);
        }
        info!(count = ids.len(), total = %total, tx = %receipt.tx_hash, "batch purchased");
        Ok(Some(receipt))
    }
}
