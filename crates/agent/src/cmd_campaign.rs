//! # Campaign Commands
//!
//! - `campaign get <id>`
//! - `campaign list`: every active campaign
//! - `campaign create --title --description --goal --beneficiary [--designer]`
//! - `campaign deactivate <id>`
//! - `campaign donations <id>`
//! - `donate <id> <amount>`

use anyhow::Result;
use merchfund_adapter::{Campaign, CampaignCreation, DonationRecord, NewCampaign};
use merchfund_chain::Receipt;
use merchfund_common::{Address, Amount, CampaignId};
use serde::Serialize;
use tracing::warn;

use crate::context::Context;
use crate::units::format_eth;

pub async fn handle_get(ctx: &Context, id: CampaignId) -> Result<()> {
    let campaign = ctx.market.get_campaign(id).await?;
    ctx.emit(&campaign, print_campaign)
}

pub async fn handle_list(ctx: &Context) -> Result<()> {
    let ids = ctx.market.active_campaign_ids().await?;
    let mut campaigns = Vec::with_capacity(ids.len());
    for id in ids {
        match ctx.market.get_campaign(id).await {
            Ok(c) => campaigns.push(c),
            Err(e) => warn!(campaign_id = id, error = %e, "skipping unreadable campaign"),
        }
    }
    ctx.emit(&campaigns, |list| {
        if list.is_empty() {
            println!("no active campaigns");
        }
        for c in list {
            println!(
                "#{:<5} {:<32} goal {:<16} {}",
                c.id,
                truncate(&c.title, 32),
                format_eth(c.goal),
                c.beneficiary
            );
        }
    })
}

pub async fn handle_create(
    ctx: &Context,
    title: String,
    description: String,
    goal: Amount,
    beneficiary: Address,
    designer: Option<Address>,
) -> Result<()> {
    let new = NewCampaign {
        title,
        description,
        goal,
        beneficiary,
        designer,
    };
    let created = ctx.market.create_campaign(&new).await?;
    ctx.emit(&created, print_creation)
}

pub async fn handle_deactivate(ctx: &Context, id: CampaignId) -> Result<()> {
    let receipt = ctx.market.deactivate_campaign(id).await?;
    ctx.emit(&TxOutput::from(&receipt), |tx| {
        println!("campaign {} deactivated in {}", id, tx.tx_hash)
    })
}

pub async fn handle_donations(ctx: &Context, id: CampaignId) -> Result<()> {
    let donations = ctx.market.campaign_donations(id).await?;
    ctx.emit(&donations, |list| print_donations(id, list))
}

pub async fn handle_donate(ctx: &Context, id: CampaignId, amount: Amount) -> Result<()> {
    let receipt = ctx.market.donate(id, amount).await?;
    ctx.emit(&TxOutput::from(&receipt), |tx| {
        println!(
            "donated {} to campaign {} (tx {}, block {})",
            format_eth(amount),
            id,
            tx.tx_hash,
            tx.block_number
        )
    })
}

/// Confirmed transaction as printed by commands.
#[derive(Debug, Serialize)]
pub struct TxOutput {
    pub tx_hash: String,
    pub block_number: u64,
}

impl From<&Receipt> for TxOutput {
    fn from(r: &Receipt) -> Self {
        Self {
            tx_hash: r.tx_hash.to_string(),
            block_number: r.block_number,
        }
    }
}

fn print_campaign(c: &Campaign) {
    println!("Campaign #{}", c.id);
    println!("  title:       {}", c.title);
    println!("  description: {}", c.description);
    println!("  goal:        {}", format_eth(c.goal));
    println!("  beneficiary: {}", c.beneficiary);
    if let Some(d) = c.designer {
        println!("  designer:    {}", d);
    }
    println!("  active:      {}", c.active);
}

fn print_creation(c: &CampaignCreation) {
    println!("campaign {} created in {}", c.campaign_id, c.tx_hash);
    println!("  resolved by: {:?}", c.resolved_by);
    if !c.verified {
        println!("  warning: read-back did not confirm the campaign yet");
    }
}

fn print_donations(id: CampaignId, list: &[DonationRecord]) {
    if list.is_empty() {
        println!("no donations for campaign {}", id);
        return;
    }
    let total: Amount = list.iter().map(|d| d.amount).fold(0, Amount::saturating_add);
    for d in list {
        let serial = d.serial.map(|s| format!("#{}", s)).unwrap_or_else(|| "-".to_string());
        println!("{} {:>24} at {} serial {}", d.donor, format_eth(d.amount), d.timestamp, serial);
    }
    println!("{} donations, {} total", list.len(), format_eth(total));
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
