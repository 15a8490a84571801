//! # Design Commands
//!
//! - `design get <id>`
//! - `design upload --campaign --name --price --file [--preview]`
//! - `design purchase <id>...`
//! - `design deactivate <id>`
//!
//! ## Upload Flow
//!
//! ```text
//! pin file (+ preview) ─► register CIDs ─► createDesign
//!                         (relayer or direct; failures are retried
//!                          inside createDesign recovery)
//! ```

use std::path::Path;

use anyhow::{Context as _, Result};
use merchfund_adapter::{BatchMode, Design, DesignCreation, NewDesign};
use merchfund_common::cid::short_cid;
use merchfund_common::{Amount, CampaignId, DesignId};
use serde::Serialize;
use tracing::{info, warn};

use crate::cmd_campaign::TxOutput;
use crate::context::Context;
use crate::pinning::PinningClient;
use crate::units::format_eth;

pub async fn handle_get(ctx: &Context, id: DesignId) -> Result<()> {
    let design = ctx.market.get_design(id).await?;
    ctx.emit(&design, print_design)
}

#[derive(Debug, Serialize)]
struct UploadOutput {
    file_cid: String,
    preview_cid: String,
    #[serde(flatten)]
    creation: DesignCreation,
}

pub async fn handle_upload(
    ctx: &Context,
    campaign_id: CampaignId,
    name: String,
    price: Amount,
    file: &Path,
    preview: Option<&Path>,
) -> Result<()> {
    let owner = ctx.sender()?;
    let pinning = PinningClient::from_config(&ctx.config.pinning)?;

    // Fail before pinning anything.
    ctx.market.ensure_campaign_active(campaign_id).await?;

    let file_cid = pinning
        .pin_file(file)
        .await
        .with_context(|| format!("pinning {}", file.display()))?
        .cid;
    let preview_cid = match preview {
        Some(p) => {
            pinning
                .pin_file(p)
                .await
                .with_context(|| format!("pinning {}", p.display()))?
                .cid
        }
        None => file_cid.clone(),
    };

    let new = NewDesign {
        campaign_id,
        name,
        price,
        file_cid: file_cid.clone(),
        preview_cid: preview_cid.clone(),
    };
    for cid in new.cids() {
        match ctx.market.registrar().register(cid, owner).await {
            Ok(reg) => info!(
                cid = short_cid(cid),
                already_registered = reg.already_registered,
                "file hash registered"
            ),
            Err(e) => warn!(cid = short_cid(cid), error = %e, "file hash registration failed"),
        }
    }

    let creation = ctx.market.create_design(&new).await?;
    let out = UploadOutput {
        file_cid,
        preview_cid,
        creation,
    };
    ctx.emit(&out, |o| {
        match o.creation.design_id {
            Some(id) => println!("design {} created in {}", id, o.creation.tx_hash),
            None => println!("design created in {} (id not resolved)", o.creation.tx_hash),
        }
        println!("  file:    {}", pinning.gateway_url(&o.file_cid));
        println!("  preview: {}", pinning.gateway_url(&o.preview_cid));
        if o.creation.retried {
            println!("  note: succeeded after re-registering {:?}", o.creation.registered);
        }
    })
}

#[derive(Debug, Serialize)]
struct PurchaseOutput {
    mode: BatchMode,
    transactions: Vec<TxOutput>,
}

pub async fn handle_purchase(ctx: &Context, ids: &[DesignId]) -> Result<()> {
    let out = if let [id] = ids {
        let receipt = ctx.market.purchase_design(*id).await?;
        PurchaseOutput {
            mode: BatchMode::Sequential,
            transactions: vec![TxOutput::from(&receipt)],
        }
    } else {
        let batch = ctx.market.purchase_designs(ids).await?;
        PurchaseOutput {
            mode: batch.mode,
            transactions: batch.receipts.iter().map(TxOutput::from).collect(),
        }
    };
    ctx.emit(&out, |o| {
        println!("purchased {} design(s) ({:?})", ids.len(), o.mode);
        for tx in &o.transactions {
            println!("  tx {} block {}", tx.tx_hash, tx.block_number);
        }
    })
}

pub async fn handle_deactivate(ctx: &Context, id: DesignId) -> Result<()> {
    let receipt = ctx.market.deactivate_design(id).await?;
    ctx.emit(&TxOutput::from(&receipt), |tx| {
        println!("design {} deactivated in {}", id, tx.tx_hash)
    })
}

fn print_design(d: &Design) {
    println!("Design #{}", d.id);
    println!("  name:     {}", d.name);
    println!("  campaign: {}", d.campaign_id);
    println!("  owner:    {}", d.owner);
    println!("  price:    {}", format_eth(d.price));
    println!("  file:     {}", d.file_cid);
    println!("  preview:  {}", d.preview_cid);
    println!("  active:   {}", d.active);
}
