//! # merchfund Common Crate
//!
//! Primitives shared by the chain client, the marketplace adapter, the
//! relayer and the CLI.
//!
//! ## Modules
//! - `types`: `Address`, `TxHash`, id and amount aliases
//! - `hexutil`: JSON-RPC hex encoding of bytes and quantities
//! - `crypto`: Keccak-256, selectors
//! - `cid`: content identifier helpers and file hashes
//! - `abi`: contract ABI encoder/decoder
//! - `contracts`: function and event descriptors of the marketplace contracts
//! - `config`: TOML + environment configuration
//! - `relayer_api`: relayer HTTP wire types
//!
//! ## Layering
//! ```text
//! ┌──────────┐   ┌──────────┐
//! │  agent   │   │ relayer  │
//! └────┬─────┘   └────┬─────┘
//!      │              │
//! ┌────▼──────────────▼┐
//! │      adapter       │
//! └─────────┬──────────┘
//!           │
//! ┌─────────▼──────────┐
//! │       chain        │
//! └─────────┬──────────┘
//!           │
//! ┌─────────▼──────────┐
//! │       common       │
//! └────────────────────┘
//! ```

pub mod abi;
pub mod cid;
pub mod config;
pub mod contracts;
pub mod crypto;
pub mod hexutil;
pub mod relayer_api;
pub mod types;

pub use abi::{AbiError, Event, Function, ParamType, Token};
pub use config::{Config, ConfigError};
pub use contracts::ContractAddresses;
pub use types::{Address, Amount, CampaignId, DesignId, HexParseError, TxHash};
