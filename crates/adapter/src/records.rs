//! # Canonical Records
//!
//! One decoding function per contract struct. Contract calls return either a
//! single tuple or the same fields flattened; both shapes normalise here and
//! callers never see raw tokens.

use merchfund_common::{Address, Amount, CampaignId, DesignId, Token};
use serde::Serialize;

use crate::errors::{AdapterError, Result};

/// Campaign as stored in the CampaignRegistry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub title: String,
    pub description: String,
    pub goal: Amount,
    pub beneficiary: Address,
    /// `None` when the contract stores the zero address.
    pub designer: Option<Address>,
    pub active: bool,
}

impl Campaign {
    /// A zero beneficiary marks an unset storage slot.
    pub fn exists(&self) -> bool {
        !self.beneficiary.is_zero()
    }
}

/// Design listed in the DesignMarketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Design {
    pub id: DesignId,
    pub campaign_id: CampaignId,
    pub owner: Address,
    pub name: String,
    pub price: Amount,
    pub file_cid: String,
    pub preview_cid: String,
    pub active: bool,
}

impl Design {
    pub fn exists(&self) -> bool {
        !self.owner.is_zero()
    }
}

/// Donation entry from the DonationVault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DonationRecord {
    pub donor: Address,
    pub campaign_id: CampaignId,
    pub amount: Amount,
    pub timestamp: u64,
    /// Collectible serial; `None` when nothing was minted.
    pub serial: Option<u64>,
}

/// Role flags of one address. Always re-read from the registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RoleFlags {
    pub is_admin: bool,
    pub is_ngo: bool,
    pub is_designer: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// DECODING
// ════════════════════════════════════════════════════════════════════════════

/// Sequential field reader over decoded tokens.
struct Fields {
    record: &'static str,
    tokens: std::vec::IntoIter<Token>,
}

impl Fields {
    /// Accept `[Tuple(fields)]` or the flat field list.
    fn new(record: &'static str, tokens: Vec<Token>, arity: usize) -> Result<Self> {
        let fields = match <[Token; 1]>::try_from(tokens) {
            Ok([Token::Tuple(inner)]) => inner,
            Ok([single]) => vec![single],
            Err(flat) => flat,
        };
        if fields.len() != arity {
            return Err(AdapterError::decode(
                record,
                format!("expected {} fields, got {}", arity, fields.len()),
            ));
        }
        Ok(Self {
            record,
            tokens: fields.into_iter(),
        })
    }

    fn next(&mut self, expected: &str) -> Result<Token> {
        self.tokens
            .next()
            .ok_or_else(|| AdapterError::decode(self.record, format!("missing {}", expected)))
    }

    fn mismatch(&self, expected: &str) -> AdapterError {
        AdapterError::decode(self.record, format!("expected {}", expected))
    }

    fn uint(&mut self) -> Result<u128> {
        self.next("uint")?.into_uint().ok_or_else(|| self.mismatch("uint"))
    }

    fn id(&mut self) -> Result<u64> {
        let value = self.uint()?;
        u64::try_from(value).map_err(|_| self.mismatch("64-bit id"))
    }

    fn address(&mut self) -> Result<Address> {
        self.next("address")?
            .into_address()
            .ok_or_else(|| self.mismatch("address"))
    }

    fn string(&mut self) -> Result<String> {
        self.next("string")?
            .into_string()
            .ok_or_else(|| self.mismatch("string"))
    }

    fn boolean(&mut self) -> Result<bool> {
        self.next("bool")?.into_bool().ok_or_else(|| self.mismatch("bool"))
    }
}

/// Decode `getCampaign` output.
pub fn decode_campaign(tokens: Vec<Token>) -> Result<Campaign> {
    let mut f = Fields::new("campaign", tokens, 7)?;
    let id = f.id()?;
    let title = f.string()?;
    let description = f.string()?;
    let goal = f.uint()?;
    let beneficiary = f.address()?;
    let designer = f.address()?;
    let active = f.boolean()?;
    Ok(Campaign {
        id,
        title,
        description,
        goal,
        beneficiary,
        designer: (!designer.is_zero()).then_some(designer),
        active,
    })
}

/// Decode `getDesign` output.
pub fn decode_design(tokens: Vec<Token>) -> Result<Design> {
    let mut f = Fields::new("design", tokens, 8)?;
    Ok(Design {
        id: f.id()?,
        campaign_id: f.id()?,
        owner: f.address()?,
        name: f.string()?,
        price: f.uint()?,
        file_cid: f.string()?,
        preview_cid: f.string()?,
        active: f.boolean()?,
    })
}

/// Decode one donation tuple.
pub fn decode_donation(token: Token) -> Result<DonationRecord> {
    let mut f = Fields::new("donation", vec![token], 5)?;
    let donor = f.address()?;
    let campaign_id = f.id()?;
    let amount = f.uint()?;
    let timestamp = f.id()?;
    let serial = f.id()?;
    Ok(DonationRecord {
        donor,
        campaign_id,
        amount,
        timestamp,
        serial: (serial != 0).then_some(serial),
    })
}

/// Decode `getCampaignDonations` output.
pub fn decode_donations(tokens: Vec<Token>) -> Result<Vec<DonationRecord>> {
    let list = single(tokens, "donations")?
        .into_array()
        .ok_or_else(|| AdapterError::decode("donations", "expected array"))?;
    list.into_iter().map(decode_donation).collect()
}

/// Decode a `uint256[]` id list.
pub fn decode_id_list(tokens: Vec<Token>) -> Result<Vec<u64>> {
    let items = single(tokens, "id list")?
        .into_array()
        .ok_or_else(|| AdapterError::decode("id list", "expected array"))?;
    items
        .into_iter()
        .map(|t| {
            t.into_uint()
                .and_then(|v| u64::try_from(v).ok())
                .ok_or_else(|| AdapterError::decode("id list", "expected 64-bit id"))
        })
        .collect()
}

/// Decode a single `uint256` return value.
pub fn decode_count(tokens: Vec<Token>) -> Result<u64> {
    single(tokens, "counter")?
        .into_uint()
        .and_then(|v| u64::try_from(v).ok())
        .ok_or_else(|| AdapterError::decode("counter", "expected 64-bit uint"))
}

/// Decode a single `bool` return value.
pub fn decode_flag(tokens: Vec<Token>, record: &'static str) -> Result<bool> {
    single(tokens, record)?
        .into_bool()
        .ok_or_else(|| AdapterError::decode(record, "expected bool"))
}

fn single(tokens: Vec<Token>, record: &'static str) -> Result<Token> {
    let len = tokens.len();
    <[Token; 1]>::try_from(tokens)
        .map(|[t]| t)
        .map_err(|_| AdapterError::decode(record, format!("expected 1 value, got {}", len)))
}
