//! Role lookup and admin commands.

use anyhow::Result;
use merchfund_adapter::RoleFlags;
use merchfund_chain::Receipt;
use merchfund_common::Address;

use crate::cmd_campaign::TxOutput;
use crate::context::Context;

/// `roles [address]`; defaults to the configured sender.
pub async fn handle_roles(ctx: &Context, address: Option<Address>) -> Result<()> {
    let account = match address {
        Some(a) => a,
        None => ctx.sender()?,
    };
    let roles = ctx.market.resolve_roles(account).await?;
    ctx.emit(&roles, |r| print_roles(account, r))
}

#[derive(Debug, Clone, Copy)]
pub enum AdminAction {
    VerifyNgo,
    VerifyDesigner,
    AddAdmin,
}

impl AdminAction {
    fn label(self) -> &'static str {
        match self {
            AdminAction::VerifyNgo => "verified as NGO",
            AdminAction::VerifyDesigner => "verified as designer",
            AdminAction::AddAdmin => "added as admin",
        }
    }
}

pub async fn handle_admin(ctx: &Context, action: AdminAction, account: Address) -> Result<()> {
    let receipt: Receipt = match action {
        AdminAction::VerifyNgo => ctx.market.verify_ngo(account).await?,
        AdminAction::VerifyDesigner => ctx.market.verify_designer(account).await?,
        AdminAction::AddAdmin => ctx.market.add_admin(account).await?,
    };
    ctx.emit(&TxOutput::from(&receipt), |tx| {
        println!("{} {} in {}", account, action.label(), tx.tx_hash)
    })
}

fn print_roles(account: Address, r: &RoleFlags) {
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    println!("{}", account);
    println!("  admin:    {}", yes_no(r.is_admin));
    println!("  ngo:      {}", yes_no(r.is_ngo));
    println!("  designer: {}", yes_no(r.is_designer));
}
