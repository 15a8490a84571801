//! # merchfund CLI
//!
//! Command-line client for the donation and merchandise marketplace.
//!
//! ## Commands
//!
//! ### Campaigns
//! - `campaign get <id>`
//! - `campaign list`
//! - `campaign create --title --description --goal --beneficiary [--designer]`
//! - `campaign deactivate <id>`
//! - `campaign donations <id>`
//! - `donate <campaign-id> <amount>`
//!
//! ### Designs
//! - `design get <id>`
//! - `design upload --campaign --name --price --file [--preview]`
//! - `design purchase <id>...`
//! - `design deactivate <id>`
//!
//! ### Accounts
//! - `roles [address]`
//! - `admin verify-ngo|verify-designer|add-admin <address>`
//!
//! Amounts are wei, or decimal ether with an `eth` suffix (`0.1eth`).
//!
//! ## Configuration
//!
//! `--config <file.toml>`, then `MERCHFUND_*` environment variables. A `.env`
//! file in the working directory is loaded first.

mod cmd_account;
mod cmd_campaign;
mod cmd_design;
mod context;
mod pinning;
mod units;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use merchfund_adapter::AdapterError;
use merchfund_common::{Address, Amount, CampaignId, DesignId};

use crate::cmd_account::AdminAction;
use crate::context::Context;

#[derive(Parser)]
#[command(name = "merchfund", version, about = "merchfund marketplace CLI")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "MERCHFUND_CONFIG")]
    config: Option<PathBuf>,

    /// Output records as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show admin / NGO / designer flags of an address (default: sender)
    Roles { address: Option<Address> },

    /// Campaign commands
    Campaign {
        #[command(subcommand)]
        campaign_cmd: CampaignCommands,
    },

    /// Donate to an active campaign
    Donate {
        campaign_id: CampaignId,
        #[arg(value_parser = units::parse_amount)]
        amount: Amount,
    },

    /// Design commands
    Design {
        #[command(subcommand)]
        design_cmd: DesignCommands,
    },

    /// Admin registry actions (requires an admin sender)
    Admin {
        #[command(subcommand)]
        admin_cmd: AdminCommands,
    },
}

#[derive(Subcommand)]
enum CampaignCommands {
    /// Show one campaign
    Get { id: CampaignId },
    /// List active campaigns
    List,
    /// Create a campaign and resolve its id
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, value_parser = units::parse_amount)]
        goal: Amount,
        #[arg(long)]
        beneficiary: Address,
        #[arg(long)]
        designer: Option<Address>,
    },
    /// Deactivate a campaign
    Deactivate { id: CampaignId },
    /// List donations of a campaign
    Donations { id: CampaignId },
}

#[derive(Subcommand)]
enum DesignCommands {
    /// Show one design
    Get { id: DesignId },
    /// Pin files, register their hashes and list a design
    Upload {
        #[arg(long)]
        campaign: CampaignId,
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = units::parse_amount)]
        price: Amount,
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        preview: Option<PathBuf>,
    },
    /// Buy one or more designs
    Purchase {
        #[arg(required = true)]
        ids: Vec<DesignId>,
    },
    /// Deactivate a design
    Deactivate { id: DesignId },
}

#[derive(Subcommand)]
enum AdminCommands {
    VerifyNgo { address: Address },
    VerifyDesigner { address: Address },
    AddAdmin { address: Address },
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = Context::build(cli.config.as_deref(), cli.json)?;

    match cli.cmd {
        Commands::Roles { address } => cmd_account::handle_roles(&ctx, address).await,
        Commands::Campaign { campaign_cmd } => match campaign_cmd {
            CampaignCommands::Get { id } => cmd_campaign::handle_get(&ctx, id).await,
            CampaignCommands::List => cmd_campaign::handle_list(&ctx).await,
            CampaignCommands::Create {
                title,
                description,
                goal,
                beneficiary,
                designer,
            } => {
                cmd_campaign::handle_create(&ctx, title, description, goal, beneficiary, designer)
                    .await
            }
            CampaignCommands::Deactivate { id } => cmd_campaign::handle_deactivate(&ctx, id).await,
            CampaignCommands::Donations { id } => cmd_campaign::handle_donations(&ctx, id).await,
        },
        Commands::Donate {
            campaign_id,
            amount,
        } => cmd_campaign::handle_donate(&ctx, campaign_id, amount).await,
        Commands::Design { design_cmd } => match design_cmd {
            DesignCommands::Get { id } => cmd_design::handle_get(&ctx, id).await,
            DesignCommands::Upload {
                campaign,
                name,
                price,
                file,
                preview,
            } => {
                cmd_design::handle_upload(&ctx, campaign, name, price, &file, preview.as_deref())
                    .await
            }
            DesignCommands::Purchase { ids } => cmd_design::handle_purchase(&ctx, &ids).await,
            DesignCommands::Deactivate { id } => cmd_design::handle_deactivate(&ctx, id).await,
        },
        Commands::Admin { admin_cmd } => {
            let (action, address) = match admin_cmd {
                AdminCommands::VerifyNgo { address } => (AdminAction::VerifyNgo, address),
                AdminCommands::VerifyDesigner { address } => (AdminAction::VerifyDesigner, address),
                AdminCommands::AddAdmin { address } => (AdminAction::AddAdmin, address),
            };
            cmd_account::handle_admin(&ctx, action, address).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<AdapterError>() {
                Some(adapter) => {
                    eprintln!("error: {}", adapter.user_message());
                    tracing::debug!(error = ?adapter, "adapter error");
                }
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}
