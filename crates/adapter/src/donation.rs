//! Donations and the active-campaign pre-flight check.

use merchfund_chain::Receipt;
use merchfund_common::contracts::{campaign_registry, donation_vault};
use merchfund_common::{Amount, CampaignId, Token};
use tracing::info;

use crate::errors::{AdapterError, ErrorKind, Result};
use crate::marketplace::Marketplace;
use crate::records::{decode_campaign, decode_donations, Campaign, DonationRecord};

impl Marketplace {
    /// Fail fast unless the campaign exists and is active.
    ///
    /// Known revert reasons from the read (e.g. a `CampaignNotFound`
    /// selector) are classified; other read failures propagate.
    pub async fn ensure_campaign_active(&self, id: CampaignId) -> Result<Campaign> {
        let out = self
            .chain
            .read(
                self.contracts.campaign_registry,
                &campaign_registry::GET_CAMPAIGN,
                &[Token::Uint(u128::from(id))],
            )
            .await
            .map_err(AdapterError::from_preflight)?;
        let campaign = decode_campaign(out)?;

        if !campaign.exists() {
            return Err(AdapterError::rejected(ErrorKind::CampaignNotFound));
        }
        if !campaign.active {
            return Err(AdapterError::rejected(ErrorKind::CampaignInactive));
        }
        Ok(campaign)
    }

    /// Donate `amount` to a campaign.
    ///
    /// A zero amount is rejected before any network call.
    pub async fn donate(&self, campaign_id: CampaignId, amount: Amount) -> Result<Receipt> {
        if amount == 0 {
            return Err(AdapterError::rejected(ErrorKind::ZeroAmount));
        }
        self.ensure_campaign_active(campaign_id).await?;

        let receipt = self
            .submit(
                self.contracts.donation_vault,
                &donation_vault::DONATE,
                &[Token::Uint(u128::from(campaign_id))],
                amount,
            )
            .await?;

        info!(campaign_id, amount = %amount, tx = %receipt.tx_hash, "donation confirmed");
        Ok(receipt)
    }

    pub async fn campaign_donations(&self, campaign_id: CampaignId) -> Result<Vec<DonationRecord>> {
        let out = self
            .chain
            .read(
                self.contracts.donation_vault,
                &donation_vault::GET_CAMPAIGN_DONATIONS,
                &[Token::Uint(u128::from(campaign_id))],
            )
            .await?;
        decode_donations(out)
    }
}
