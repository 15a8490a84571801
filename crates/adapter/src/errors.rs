//! Adapter error taxonomy and the user-facing vocabulary.

use std::fmt;

use merchfund_chain::ChainError;
use merchfund_common::{DesignId, TxHash};
use thiserror::Error;

use crate::registrar::RegistrarError;
use crate::translate::translate;

// ════════════════════════════════════════════════════════════════════════════
// ERROR KIND
// ════════════════════════════════════════════════════════════════════════════

/// Closed set of reasons a donation, purchase or creation is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    CampaignInactive,
    CampaignNotFound,
    TransferFailed,
    ReentrancyBlocked,
    ZeroAmount,
    /// Revert reason outside the fixed table; keeps the original message.
    Unknown(String),
}

impl ErrorKind {
    /// Message shown to end users.
    pub fn user_message(&self) -> String {
        match self {
            ErrorKind::CampaignInactive => "This campaign is no longer active.".to_string(),
            ErrorKind::CampaignNotFound => "This campaign does not exist.".to_string(),
            ErrorKind::TransferFailed => {
                "The payment transfer failed. Please check your balance and try again.".to_string()
            }
            ErrorKind::ReentrancyBlocked => {
                "The transaction was blocked for safety reasons. Please try again.".to_string()
            }
            ErrorKind::ZeroAmount => "Amount must be greater than zero.".to_string(),
            ErrorKind::Unknown(msg) => format!("Transaction failed: {}", msg),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::CampaignInactive => write!(f, "campaign inactive"),
            ErrorKind::CampaignNotFound => write!(f, "campaign not found"),
            ErrorKind::TransferFailed => write!(f, "transfer failed"),
            ErrorKind::ReentrancyBlocked => write!(f, "reentrancy blocked"),
            ErrorKind::ZeroAmount => write!(f, "zero amount"),
            ErrorKind::Unknown(msg) => write!(f, "unknown: {}", msg),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ADAPTER ERROR
// ════════════════════════════════════════════════════════════════════════════

/// Failure of an adapter operation.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Chain call failed and was not classified (read errors, transport).
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// Operation rejected, locally or by the ledger.
    #[error("rejected: {0}")]
    Rejected(ErrorKind),

    /// Campaign creation transaction was confirmed as reverted.
    #[error("campaign creation reverted in {tx_hash}")]
    CampaignCreationFailed { tx_hash: TxHash },

    /// Creation succeeded on-chain but no campaign id could be determined.
    #[error("campaign created in {tx_hash} but its id could not be resolved")]
    CampaignIdUnresolved { tx_hash: TxHash },

    #[error("design {0} not found")]
    DesignNotFound(DesignId),

    #[error("design {0} is not active")]
    DesignInactive(DesignId),

    /// Contract returned a shape that does not match the record layout.
    #[error("cannot decode {record}: {reason}")]
    Decode { record: &'static str, reason: String },

    #[error(transparent)]
    Registrar(#[from] RegistrarError),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, AdapterError>;

impl AdapterError {
    pub fn rejected(kind: ErrorKind) -> Self {
        AdapterError::Rejected(kind)
    }

    /// Classify a failed write: reverts become `Rejected(kind)`.
    pub fn from_write(err: ChainError) -> Self {
        match err.revert() {
            Some(revert) => AdapterError::Rejected(translate(revert)),
            None => AdapterError::Chain(err),
        }
    }

    /// Classify a failed pre-flight read: known revert reasons become
    /// `Rejected(kind)`, everything else stays a chain error.
    pub fn from_preflight(err: ChainError) -> Self {
        match err.revert().map(translate) {
            Some(ErrorKind::Unknown(_)) | None => AdapterError::Chain(err),
            Some(kind) => AdapterError::Rejected(kind),
        }
    }

    pub fn kind(&self) -> Option<&ErrorKind> {
        match self {
            AdapterError::Rejected(kind) => Some(kind),
            _ => None,
        }
    }

    pub(crate) fn decode(record: &'static str, reason: impl Into<String>) -> Self {
        AdapterError::Decode {
            record,
            reason: reason.into(),
        }
    }

    /// Fixed-vocabulary message for end users. Raw chain text only appears
    /// inside the `Unknown` message.
    pub fn user_message(&self) -> String {
        match self {
            AdapterError::Rejected(kind) => kind.user_message(),
            AdapterError::Chain(_) => {
                "Could not reach the blockchain. Please try again later.".to_string()
            }
            AdapterError::CampaignCreationFailed { .. } => {
                "Campaign creation failed on-chain.".to_string()
            }
            AdapterError::CampaignIdUnresolved { .. } => {
                "Campaign was created but its id could not be determined. Please refresh."
                    .to_string()
            }
            AdapterError::DesignNotFound(_) => "This design does not exist.".to_string(),
            AdapterError::DesignInactive(_) => "This design is no longer available.".to_string(),
            AdapterError::Decode { .. } => "Unexpected response from the contract.".to_string(),
            AdapterError::Registrar(_) => "File registration failed.".to_string(),
            AdapterError::InvalidInput(msg) => format!("Invalid input: {}", msg),
        }
    }
}
