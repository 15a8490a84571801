//! Shared fixtures for adapter integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use merchfund_adapter::{AdapterConfig, Marketplace};
use merchfund_chain::{ChainError, Log, MockChain, RevertData};
use merchfund_common::abi::encode;
use merchfund_common::contracts::campaign_registry::CAMPAIGN_CREATED;
use merchfund_common::contracts::design_marketplace::DESIGN_CREATED;
use merchfund_common::{Address, ContractAddresses, Token};

pub const FILE_CID: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";
pub const PREVIEW_CID: &str = "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi";

pub const BENEFICIARY: Address = Address([0x0b; 20]);
pub const DESIGNER: Address = Address([0x0d; 20]);

pub fn contracts() -> ContractAddresses {
    ContractAddresses {
        campaign_registry: Address([0x01; 20]),
        donation_vault: Address([0x02; 20]),
        design_marketplace: Address([0x03; 20]),
        file_registry: Address([0x04; 20]),
        admin_registry: Address([0x05; 20]),
        ngo_registry: Address([0x06; 20]),
        designer_registry: Address([0x07; 20]),
    }
}

/// Marketplace over `mock` with no verify delay.
pub fn market(mock: &Arc<MockChain>) -> Marketplace {
    Marketplace::new(mock.clone(), contracts()).with_config(AdapterConfig {
        verify_delay: Duration::ZERO,
        combined_batch: true,
    })
}

pub fn campaign_tokens(id: u64, active: bool) -> Vec<Token> {
    vec![Token::Tuple(vec![
        Token::Uint(u128::from(id)),
        Token::String("Clean Water".into()),
        Token::String("Wells for villages".into()),
        Token::Uint(1_000),
        Token::Address(BENEFICIARY),
        Token::Address(Address::ZERO),
        Token::Bool(active),
    ])]
}

/// `getCampaign` answer for an id that was never created.
pub fn empty_campaign_tokens() -> Vec<Token> {
    vec![Token::Tuple(vec![
        Token::Uint(0),
        Token::String(String::new()),
        Token::String(String::new()),
        Token::Uint(0),
        Token::Address(Address::ZERO),
        Token::Address(Address::ZERO),
        Token::Bool(false),
    ])]
}

pub fn design_tokens(id: u64, campaign_id: u64, price: u128, active: bool) -> Vec<Token> {
    vec![Token::Tuple(vec![
        Token::Uint(u128::from(id)),
        Token::Uint(u128::from(campaign_id)),
        Token::Address(DESIGNER),
        Token::String(format!("Design {}", id)),
        Token::Uint(price),
        Token::String(FILE_CID.into()),
        Token::String(PREVIEW_CID.into()),
        Token::Bool(active),
    ])]
}

fn uint_topic(v: u64) -> [u8; 32] {
    let mut t = [0u8; 32];
    t[24..].copy_from_slice(&v.to_be_bytes());
    t
}

pub fn campaign_created_log(id: u64) -> Log {
    let mut ngo = [0u8; 32];
    ngo[12..].copy_from_slice(BENEFICIARY.as_bytes());
    Log {
        address: contracts().campaign_registry,
        topics: vec![CAMPAIGN_CREATED.topic0(), uint_topic(id), ngo],
        data: encode(&[Token::String("Clean Water".into()), Token::Uint(1_000)]),
    }
}

pub fn design_created_log(id: u64, campaign_id: u64) -> Log {
    Log {
        address: contracts().design_marketplace,
        topics: vec![DESIGN_CREATED.topic0(), uint_topic(id), uint_topic(campaign_id)],
        data: encode(&[Token::Address(DESIGNER)]),
    }
}

pub fn count(n: u64) -> Vec<Token> {
    vec![Token::Uint(u128::from(n))]
}

pub fn flag(v: bool) -> Vec<Token> {
    vec![Token::Bool(v)]
}

pub fn ids(list: &[u64]) -> Vec<Token> {
    vec![Token::Array(list.iter().map(|i| Token::Uint(u128::from(*i))).collect())]
}

/// Simulation revert carrying only a custom-error selector.
pub fn selector_revert(selector: [u8; 4]) -> ChainError {
    ChainError::Write(RevertData::new("execution reverted").with_data(selector.to_vec()))
}

pub fn read_failure(msg: &str) -> ChainError {
    ChainError::Read(RevertData::new(msg))
}
