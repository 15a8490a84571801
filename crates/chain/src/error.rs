//! Chain call errors and revert payloads.

use merchfund_common::AbiError;
use thiserror::Error;

/// Structured revert information surfaced by the node.
///
/// Nodes and signing proxies wrap reverts differently; the nesting is kept
/// as a `cause` chain so the translator can search every level.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RevertData {
    /// Full error message.
    pub message: String,
    /// Reason string without node decorations, when available.
    pub short_message: Option<String>,
    /// Raw revert bytes (custom error selector + arguments).
    pub data: Option<Vec<u8>>,
    pub cause: Option<Box<RevertData>>,
}

impl RevertData {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_short_message(mut self, short: impl Into<String>) -> Self {
        self.short_message = Some(short.into());
        self
    }

    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_cause(mut self, cause: RevertData) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Leading four bytes of the revert data at this level.
    pub fn selector(&self) -> Option<[u8; 4]> {
        let data = self.data.as_deref()?;
        let head = data.get(..4)?;
        Some([head[0], head[1], head[2], head[3]])
    }

    /// This payload followed by each nested cause, outermost first.
    pub fn levels(&self) -> impl Iterator<Item = &RevertData> {
        std::iter::successors(Some(self), |r| r.cause.as_deref())
    }
}

/// Chain call layer failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Read-only call failed: node unreachable, RPC error or revert.
    #[error("chain read failed: {}", .0.message)]
    Read(RevertData),

    /// Write failed during simulation or submission.
    #[error("chain write failed: {}", .0.message)]
    Write(RevertData),

    /// `eth_sendTransaction` failed at the transport level; the node may
    /// still have accepted the transaction.
    #[error("transaction submission unconfirmed: {0}")]
    Unconfirmed(String),

    /// Receipt polling failed at the transport level.
    #[error("waiting for receipt failed: {0}")]
    Wait(String),

    /// Write attempted without a configured sender account.
    #[error("no sender account configured")]
    NoSender,

    #[error(transparent)]
    Abi(#[from] AbiError),

    /// Node answered with something that is not a valid response.
    #[error("malformed node response: {0}")]
    Malformed(String),

    #[error("http client setup failed: {0}")]
    Setup(String),
}

impl ChainError {
    /// Revert payload carried by read/write failures.
    pub fn revert(&self) -> Option<&RevertData> {
        match self {
            ChainError::Read(r) | ChainError::Write(r) => Some(r),
            _ => None,
        }
    }
}
