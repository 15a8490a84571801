//! # Ledger Primitive Types
//!
//! Fixed-width identifiers shared by every merchfund crate.
//!
//! ## Types
//!
//! | Type | Width | Text form |
//! |------|-------|-----------|
//! | [`Address`] | 20 bytes | `0x` + 40 lowercase hex chars |
//! | [`TxHash`] | 32 bytes | `0x` + 64 lowercase hex chars |
//!
//! Parsing accepts an optional `0x`/`0X` prefix and mixed-case hex.
//! Display always emits the lowercase prefixed form, which is also the
//! key format used by the off-chain document store (lower-cased wallet
//! address).
//!
//! Campaign and design identifiers are `u64`; amounts are `u128` in the
//! chain's smallest unit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// On-chain campaign identifier.
pub type CampaignId = u64;

/// On-chain design identifier.
pub type DesignId = u64;

/// Amount in the chain's smallest unit (wei-like).
pub type Amount = u128;

// ════════════════════════════════════════════════════════════════════════════
// PARSE ERROR
// ════════════════════════════════════════════════════════════════════════════

/// Error returned when a hex identifier cannot be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HexParseError {
    /// Decoded length does not match the identifier width.
    #[error("invalid length: expected {expected} hex chars, found {found}")]
    InvalidLength { expected: usize, found: usize },

    /// Input contains non-hex characters.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

fn parse_fixed<const N: usize>(input: &str) -> Result<[u8; N], HexParseError> {
    let body = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);

    if body.len() != N * 2 {
        return Err(HexParseError::InvalidLength {
            expected: N * 2,
            found: body.len(),
        });
    }

    let mut out = [0u8; N];
    hex::decode_to_slice(body, &mut out)
        .map_err(|e| HexParseError::InvalidHex(e.to_string()))?;
    Ok(out)
}

// ════════════════════════════════════════════════════════════════════════════
// HEX NEWTYPES
// ════════════════════════════════════════════════════════════════════════════

macro_rules! hex_newtype {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// All-zero value.
            pub const ZERO: Self = Self([0u8; $len]);

            /// Returns `true` if every byte is zero.
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            /// Raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl FromStr for $name {
            type Err = HexParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_fixed::<$len>(s.trim()).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_newtype!(
    /// 20-byte account or contract address.
    Address,
    20
);

hex_newtype!(
    /// 32-byte transaction hash.
    TxHash,
    32
);

// ════════════════════════════════════════════════════════════════════════════
// TESTS
// ════════════════════════════════════════════════════════════════════════════
