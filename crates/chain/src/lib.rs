//! # merchfund Chain Call Layer
//!
//! Read, simulate-then-write and receipt waiting against a contract node.
//!
//! ## Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `client` | [`ChainClient`] trait |
//! | `json_rpc` | [`JsonRpcChain`]: HTTP JSON-RPC implementation |
//! | `mock` | [`MockChain`]: scripted in-memory implementation |
//! | `receipt` | [`Receipt`], [`TxStatus`], [`Log`] |
//! | `poll` | [`PollConfig`]: receipt polling backoff |
//! | `error` | [`ChainError`], [`RevertData`] |
//!
//! ## Flow
//!
//! ```text
//! read(contract, fn, args) ──► eth_call ──► decode outputs
//!
//! write(contract, fn, args, value)
//!      │
//!      ├─ eth_call (simulation) ── revert ──► ChainError::Write(RevertData)
//!      │
//!      └─ eth_sendTransaction ──► TxHash
//!
//! wait(TxHash) ──► eth_getTransactionReceipt (polled) ──► Receipt
//! ```
//!
//! The layer holds no state between calls. Re-reading is always safe;
//! avoiding duplicate writes is the caller's responsibility.

pub mod client;
pub mod error;
pub mod json_rpc;
pub mod mock;
pub mod poll;
pub mod receipt;

pub use client::ChainClient;
pub use error::{ChainError, RevertData};
pub use json_rpc::{JsonRpcChain, JsonRpcConfig};
pub use mock::{MockCall, MockChain, MockWrite};
pub use poll::PollConfig;
pub use receipt::{Log, Receipt, TxStatus};
