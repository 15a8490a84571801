//! # Transaction Receipts
//!
//! Node-independent receipt model. Status values are normalised from the
//! many shapes RPC providers emit (`"0x1"`, `"1"`, `1`, `"success"`, ...).

use merchfund_common::hexutil;
use merchfund_common::{Address, TxHash};
use serde_json::Value;

/// Final transaction outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    Reverted,
}

impl TxStatus {
    /// Parse a status field. Unknown shapes yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(true) => Some(TxStatus::Success),
            Value::Bool(false) => Some(TxStatus::Reverted),
            Value::Number(n) => match n.as_u64()? {
                1 => Some(TxStatus::Success),
                0 => Some(TxStatus::Reverted),
                _ => None,
            },
            Value::String(s) => Self::from_text(s),
            _ => None,
        }
    }

    pub fn from_text(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "success" => Some(TxStatus::Success),
            "reverted" | "failure" => Some(TxStatus::Reverted),
            other => match hexutil::parse_quantity(other)? {
                1 => Some(TxStatus::Success),
                0 => Some(TxStatus::Reverted),
                _ => None,
            },
        }
    }
}

/// Event log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<[u8; 32]>,
    pub data: Vec<u8>,
}

/// Confirmed transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub status: TxStatus,
    pub logs: Vec<Log>,
}

impl Receipt {
    pub fn success(tx_hash: TxHash) -> Self {
        Self {
            tx_hash,
            block_number: 1,
            status: TxStatus::Success,
            logs: Vec::new(),
        }
    }

    pub fn reverted(tx_hash: TxHash) -> Self {
        Self {
            status: TxStatus::Reverted,
            ..Self::success(tx_hash)
        }
    }

    pub fn with_log(mut self, log: Log) -> Self {
        self.logs.push(log);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == TxStatus::Success
    }

    /// Parse an `eth_getTransactionReceipt` result object.
    pub fn from_json(value: &Value) -> Result<Self, String> {
        let field = |name: &str| value.get(name).ok_or_else(|| format!("receipt missing '{}'", name));

        let tx_hash = field("transactionHash")?
            .as_str()
            .ok_or("transactionHash is not a string")?
            .parse::<TxHash>()
            .map_err(|e| format!("transactionHash: {}", e))?;

        let block_number = match value.get("blockNumber") {
            Some(Value::String(s)) => hexutil::parse_quantity(s)
                .and_then(|n| u64::try_from(n).ok())
                .ok_or_else(|| format!("invalid blockNumber '{}'", s))?,
            Some(Value::Number(n)) => n.as_u64().ok_or("invalid blockNumber")?,
            _ => 0,
        };

        let status_value = field("status")?;
        let status = TxStatus::from_json(status_value)
            .ok_or_else(|| format!("unrecognised receipt status {}", status_value))?;

        let logs = match value.get("logs") {
            Some(Value::Array(items)) => items
                .iter()
                .map(parse_log)
                .collect::<Result<Vec<_>, _>>()?,
            _ => Vec::new(),
        };

        Ok(Self {
            tx_hash,
            block_number,
            status,
            logs,
        })
    }
}

fn parse_log(value: &Value) -> Result<Log, String> {
    let address = value
        .get("address")
        .and_then(Value::as_str)
        .ok_or("log missing address")?
        .parse::<Address>()
        .map_err(|e| format!("log address: {}", e))?;

    let topics = value
        .get("topics")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|t| {
                    let text = t.as_str().ok_or("topic is not a string")?;
                    let bytes: [u8; 32] = text
                        .parse::<TxHash>()
                        .map_err(|e| format!("topic: {}", e))?
                        .0;
                    Ok::<_, String>(bytes)
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?
        .unwrap_or_default();

    let data = match value.get("data").and_then(Value::as_str) {
        Some(s) => hexutil::decode_prefixed(s).map_err(|e| format!("log data: {}", e))?,
        None => Vec::new(),
    };

    Ok(Log {
        address,
        topics,
        data,
    })
}
