//! # Marketplace Client
//!
//! [`Marketplace`] is the explicitly constructed entry point of the adapter.
//! It owns the chain client, the contract addresses and the hash registrar;
//! there is no module-level state.
//!
//! ```rust,ignore
//! let chain = Arc::new(JsonRpcChain::new(JsonRpcConfig::from(&cfg))?);
//! let market = Marketplace::new(chain, cfg.contracts);
//! let campaign = market.get_campaign(3).await?;
//! ```
//!
//! Protocol-level operations live in sibling modules (`campaign`,
//! `design`, `donation`, `purchase`, `roles`) as further `impl Marketplace`
//! blocks.

use std::sync::Arc;
use std::time::Duration;

use merchfund_chain::{ChainClient, Receipt};
use merchfund_common::contracts::{
    admin_registry, campaign_registry, design_marketplace, designer_registry, ngo_registry,
};
use merchfund_common::{Address, Amount, CampaignId, Config, ContractAddresses, DesignId, Function, Token};
use tracing::{debug, info};

use crate::errors::{AdapterError, ErrorKind, Result};
use crate::records::{decode_campaign, decode_count, decode_design, decode_id_list, Campaign, Design};
use crate::registrar::{DirectRegistrar, HashRegistrar};

/// Tunables of the adapter protocols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Wait before reading back a freshly created campaign.
    pub verify_delay: Duration,
    /// Try `purchaseDesigns` before falling back to single purchases.
    pub combined_batch: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            verify_delay: Duration::from_secs(1),
            combined_batch: true,
        }
    }
}

impl From<&Config> for AdapterConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            verify_delay: Duration::from_millis(cfg.verify_delay_ms),
            ..Self::default()
        }
    }
}

/// Marketplace adapter over one chain client.
#[derive(Clone)]
pub struct Marketplace {
    pub(crate) chain: Arc<dyn ChainClient>,
    pub(crate) contracts: ContractAddresses,
    pub(crate) registrar: Arc<dyn HashRegistrar>,
    pub(crate) config: AdapterConfig,
}

impl Marketplace {
    /// Adapter with default tunables that registers file hashes directly.
    pub fn new(chain: Arc<dyn ChainClient>, contracts: ContractAddresses) -> Self {
        let registrar = Arc::new(DirectRegistrar::new(chain.clone(), contracts.file_registry));
        Self {
            chain,
            contracts,
            registrar,
            config: AdapterConfig::default(),
        }
    }

    #[must_use]
    pub fn with_registrar(mut self, registrar: Arc<dyn HashRegistrar>) -> Self {
        self.registrar = registrar;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: AdapterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn chain(&self) -> &Arc<dyn ChainClient> {
        &self.chain
    }

    pub fn contracts(&self) -> &ContractAddresses {
        &self.contracts
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn registrar(&self) -> &Arc<dyn HashRegistrar> {
        &self.registrar
    }

    // ════════════════════════════════════════════════════════════════════════
    // SUBMISSION
    // ════════════════════════════════════════════════════════════════════════

    /// Write, wait, and require a successful receipt.
    ///
    /// # Errors
    ///
    /// - `Rejected(kind)` when the simulation reverts (translated) or the
    ///   receipt reports a revert (`Unknown("transaction reverted")`).
    /// - `Chain(_)` for transport failures.
    pub(crate) async fn submit(
        &self,
        contract: Address,
        function: &Function,
        args: &[Token],
        value: Amount,
    ) -> Result<Receipt> {
        let tx = self
            .chain
            .write(contract, function, args, value)
            .await
            .map_err(AdapterError::from_write)?;
        let receipt = self.chain.wait(tx).await?;
        if !receipt.is_success() {
            debug!(function = function.name, tx = %tx, "transaction reverted");
            return Err(AdapterError::rejected(ErrorKind::Unknown(
                "transaction reverted".to_string(),
            )));
        }
        Ok(receipt)
    }

    pub(crate) fn require_sender(&self) -> Result<Address> {
        self.chain
            .sender()
            .ok_or_else(|| AdapterError::InvalidInput("no wallet account connected".to_string()))
    }

    // ════════════════════════════════════════════════════════════════════════
    // READS
    // ════════════════════════════════════════════════════════════════════════

    pub async fn campaign_count(&self) -> Result<u64> {
        let out = self
            .chain
            .read(self.contracts.campaign_registry, &campaign_registry::CAMPAIGN_COUNT, &[])
            .await?;
        decode_count(out)
    }

    /// Fetch a campaign. A zero beneficiary is reported as not found.
    pub async fn get_campaign(&self, id: CampaignId) -> Result<Campaign> {
        let campaign = self.read_campaign(id).await?;
        if !campaign.exists() {
            return Err(AdapterError::rejected(ErrorKind::CampaignNotFound));
        }
        Ok(campaign)
    }

    /// Raw `getCampaign`; unknown ids decode to an empty record.
    pub(crate) async fn read_campaign(&self, id: CampaignId) -> Result<Campaign> {
        let out = self
            .chain
            .read(
                self.contracts.campaign_registry,
                &campaign_registry::GET_CAMPAIGN,
                &[Token::Uint(u128::from(id))],
            )
            .await?;
        decode_campaign(out)
    }

    pub async fn active_campaign_ids(&self) -> Result<Vec<CampaignId>> {
        let out = self
            .chain
            .read(
                self.contracts.campaign_registry,
                &campaign_registry::GET_ACTIVE_CAMPAIGNS,
                &[],
            )
            .await?;
        decode_id_list(out)
    }

    pub async fn design_count(&self) -> Result<u64> {
        let out = self
            .chain
            .read(self.contracts.design_marketplace, &design_marketplace::DESIGN_COUNT, &[])
            .await?;
        decode_count(out)
    }

    /// Fetch a design. A zero owner is reported as not found.
    pub async fn get_design(&self, id: DesignId) -> Result<Design> {
        let out = self
            .chain
            .read(
                self.contracts.design_marketplace,
                &design_marketplace::GET_DESIGN,
                &[Token::Uint(u128::from(id))],
            )
            .await?;
        let design = decode_design(out)?;
        if !design.exists() {
            return Err(AdapterError::DesignNotFound(id));
        }
        Ok(design)
    }

    // ════════════════════════════════════════════════════════════════════════
    // ADMIN ACTIONS
    // ════════════════════════════════════════════════════════════════════════

    pub async fn deactivate_campaign(&self, id: CampaignId) -> Result<Receipt> {
        let receipt = self
            .submit(
                self.contracts.campaign_registry,
                &campaign_registry::DEACTIVATE_CAMPAIGN,
                &[Token::Uint(u128::from(id))],
                0,
            )
            .await?;
        info!(campaign_id = id, tx = %receipt.tx_hash, "campaign deactivated");
        Ok(receipt)
    }

    pub async fn deactivate_design(&self, id: DesignId) -> Result<Receipt> {
        let receipt = self
            .submit(
                self.contracts.design_marketplace,
                &design_marketplace::DEACTIVATE_DESIGN,
                &[Token::Uint(u128::from(id))],
                0,
            )
            .await?;
        info!(design_id = id, tx = %receipt.tx_hash, "design deactivated");
        Ok(receipt)
    }

    pub async fn verify_ngo(&self, account: Address) -> Result<Receipt> {
        self.submit(
            self.contracts.ngo_registry,
            &ngo_registry::VERIFY_NGO,
            &[Token::Address(account)],
            0,
        )
        .await
    }

    pub async fn verify_designer(&self, account: Address) -> Result<Receipt> {
        self.submit(
            self.contracts.designer_registry,
            &designer_registry::VERIFY_DESIGNER,
            &[Token::Address(account)],
            0,
        )
        .await
    }

    pub async fn add_admin(&self, account: Address) -> Result<Receipt> {
        self.submit(
            self.contracts.admin_registry,
            &admin_registry::ADD_ADMIN,
            &[Token::Address(account)],
            0,
        )
        .await
    }
}

const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn check() {
        assert_send_sync::<Marketplace>();
    }
    let _ = check;
};
