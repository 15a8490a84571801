//! # JSON-RPC Chain Client
//!
//! [`ChainClient`] over HTTP JSON-RPC.
//!
//! ## Method Mapping
//!
//! | Operation | RPC method(s) |
//! |-----------|---------------|
//! | `read` | `eth_call` |
//! | `write` | `eth_call` (simulation), then `eth_sendTransaction` |
//! | `wait` | `eth_getTransactionReceipt` (polled) |
//! | `chain_id` | `eth_chainId` |
//!
//! Transactions are sent from the configured sender account; the node or
//! a signing proxy in front of it holds the key.
//!
//! ## Revert Extraction
//!
//! Nodes report reverts as JSON-RPC errors whose `data` is either the raw
//! revert bytes (`"0x2c067cd7..."`) or a nested object carrying its own
//! `message`/`data`. Every nesting level becomes a [`RevertData::cause`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use merchfund_common::hexutil;
use merchfund_common::{Address, Amount, Config, Function, Token, TxHash};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::client::ChainClient;
use crate::error::{ChainError, RevertData};
use crate::poll::PollConfig;
use crate::receipt::Receipt;

const REVERT_PREFIX: &str = "execution reverted: ";

// ════════════════════════════════════════════════════════════════════════════
// CONFIG
// ════════════════════════════════════════════════════════════════════════════

/// Connection settings for [`JsonRpcChain`].
#[derive(Debug, Clone)]
pub struct JsonRpcConfig {
    pub rpc_url: String,
    pub auth_token: Option<String>,
    pub timeout_ms: u64,
    pub sender: Option<Address>,
    pub poll: PollConfig,
}

impl JsonRpcConfig {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            auth_token: None,
            timeout_ms: 30_000,
            sender: None,
            poll: PollConfig::default(),
        }
    }
}

impl From<&Config> for JsonRpcConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            rpc_url: cfg.rpc_url.clone(),
            auth_token: cfg.rpc_auth_token.clone(),
            timeout_ms: cfg.rpc_timeout_ms,
            sender: cfg.sender,
            poll: PollConfig::with_initial_ms(cfg.receipt_poll_ms),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// WIRE TYPES
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// Failure of a single RPC round trip.
#[derive(Debug)]
enum RpcFailure {
    Transport(String),
    Rpc(JsonRpcError),
    Malformed(String),
}

impl RpcFailure {
    fn into_revert(self) -> RevertData {
        match self {
            RpcFailure::Transport(msg) => RevertData::new(msg),
            RpcFailure::Rpc(err) => revert_from_rpc_error(&err),
            RpcFailure::Malformed(msg) => RevertData::new(format!("malformed response: {}", msg)),
        }
    }
}

fn short_reason(message: &str) -> Option<String> {
    message
        .strip_prefix(REVERT_PREFIX)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Build a revert payload from an object-shaped `data` field.
fn revert_from_value(value: &Value) -> Option<RevertData> {
    match value {
        Value::String(s) => {
            let bytes = hexutil::decode_prefixed(s).ok()?;
            Some(RevertData {
                message: s.clone(),
                data: Some(bytes),
                ..RevertData::default()
            })
        }
        Value::Object(map) => {
            let message = map
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let mut revert = RevertData {
                short_message: short_reason(&message),
                message,
                ..RevertData::default()
            };
            match map.get("data") {
                Some(Value::String(s)) => revert.data = hexutil::decode_prefixed(s).ok(),
                Some(nested @ Value::Object(_)) => {
                    revert.cause = revert_from_value(nested).map(Box::new);
                }
                _ => {}
            }
            if revert.cause.is_none() {
                if let Some(inner) = map.get("cause").or_else(|| map.get("originalError")) {
                    revert.cause = revert_from_value(inner).map(Box::new);
                }
            }
            Some(revert)
        }
        _ => None,
    }
}

fn revert_from_rpc_error(err: &JsonRpcError) -> RevertData {
    let mut revert = RevertData {
        message: err.message.clone(),
        short_message: short_reason(&err.message),
        ..RevertData::default()
    };
    match &err.data {
        Some(Value::String(s)) => revert.data = hexutil::decode_prefixed(s).ok(),
        Some(nested @ Value::Object(_)) => revert.cause = revert_from_value(nested).map(Box::new),
        _ => {}
    }
    revert
}

// ════════════════════════════════════════════════════════════════════════════
// CLIENT
// ════════════════════════════════════════════════════════════════════════════

/// HTTP JSON-RPC chain client.
pub struct JsonRpcChain {
    config: JsonRpcConfig,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl std::fmt::Debug for JsonRpcChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcChain")
            .field("rpc_url", &self.config.rpc_url)
            .field("sender", &self.config.sender)
            .field("client", &"reqwest::Client")
            .finish()
    }
}

impl JsonRpcChain {
    /// Build a client. No request is made until the first call.
    ///
    /// # Errors
    ///
    /// `ChainError::Setup` if the HTTP client cannot be constructed.
    pub fn new(config: JsonRpcConfig) -> Result<Self, ChainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ChainError::Setup(e.to_string()))?;

        Ok(Self {
            config,
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &JsonRpcConfig {
        &self.config
    }

    async fn rpc(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcFailure> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!(method, id = request.id, "rpc request");

        let mut req_builder = self
            .client
            .post(&self.config.rpc_url)
            .header("Content-Type", "application/json");

        if let Some(ref token) = self.config.auth_token {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", token));
        }

        let response = req_builder.json(&request).send().await.map_err(|e| {
            if e.is_timeout() {
                RpcFailure::Transport(format!("{} timed out", method))
            } else if e.is_connect() {
                RpcFailure::Transport(format!("node unreachable: {}", e))
            } else {
                RpcFailure::Transport(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RpcFailure::Transport(format!("failed to read response: {}", e)))?;

        // Some nodes answer reverts with HTTP 4xx/5xx and a JSON-RPC error body.
        let parsed: JsonRpcResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(RpcFailure::Transport(format!("HTTP error: {}", status)));
            }
            Err(e) => return Err(RpcFailure::Malformed(e.to_string())),
        };

        if let Some(error) = parsed.error {
            debug!(method, code = error.code, message = %error.message, "rpc error");
            return Err(RpcFailure::Rpc(error));
        }

        Ok(parsed.result.unwrap_or(Value::Null))
    }

    fn call_object(&self, contract: Address, calldata: &[u8], value: Amount) -> Value {
        let mut call = json!({
            "to": contract.to_string(),
            "data": hexutil::encode_prefixed(calldata),
        });
        if let Some(from) = self.config.sender {
            call["from"] = json!(from.to_string());
        }
        if value > 0 {
            call["value"] = json!(hexutil::to_quantity(value));
        }
        call
    }
}

fn result_bytes(value: &Value) -> Result<Vec<u8>, String> {
    let text = value.as_str().ok_or_else(|| format!("expected hex string, got {}", value))?;
    hexutil::decode_prefixed(text).map_err(|e| e.to_string())
}

#[async_trait]
impl ChainClient for JsonRpcChain {
    fn sender(&self) -> Option<Address> {
        self.config.sender
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        let value = self
            .rpc("eth_chainId", Vec::new())
            .await
            .map_err(|e| ChainError::Read(e.into_revert()))?;
        value
            .as_str()
            .and_then(hexutil::parse_quantity)
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| ChainError::Malformed(format!("eth_chainId returned {}", value)))
    }

    async fn read(
        &self,
        contract: Address,
        function: &Function,
        args: &[Token],
    ) -> Result<Vec<Token>, ChainError> {
        let calldata = function.encode_call(args)?;
        let call = self.call_object(contract, &calldata, 0);

        let value = self
            .rpc("eth_call", vec![call, json!("latest")])
            .await
            .map_err(|e| ChainError::Read(e.into_revert()))?;

        let bytes = result_bytes(&value).map_err(ChainError::Malformed)?;
        Ok(function.decode_output(&bytes)?)
    }

    async fn write(
        &self,
        contract: Address,
        function: &Function,
        args: &[Token],
        value: Amount,
    ) -> Result<TxHash, ChainError> {
        if self.config.sender.is_none() {
            return Err(ChainError::NoSender);
        }
        let calldata = function.encode_call(args)?;
        let call = self.call_object(contract, &calldata, value);

        if let Err(e) = self.rpc("eth_call", vec![call.clone(), json!("latest")]).await {
            let revert = e.into_revert();
            warn!(
                contract = %contract,
                function = function.name,
                reason = %revert.message,
                "simulation failed, transaction not sent"
            );
            return Err(ChainError::Write(revert));
        }

        let hash_value = self
            .rpc("eth_sendTransaction", vec![call])
            .await
            .map_err(|e| match e {
                RpcFailure::Transport(msg) => ChainError::Unconfirmed(msg),
                other => ChainError::Write(other.into_revert()),
            })?;

        let tx_hash = hash_value
            .as_str()
            .ok_or_else(|| ChainError::Malformed(format!("eth_sendTransaction returned {}", hash_value)))?
            .parse::<TxHash>()
            .map_err(|e| ChainError::Malformed(e.to_string()))?;

        debug!(contract = %contract, function = function.name, tx = %tx_hash, "transaction sent");
        Ok(tx_hash)
    }

    async fn wait(&self, tx: TxHash) -> Result<Receipt, ChainError> {
        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            let value = self
                .rpc("eth_getTransactionReceipt", vec![json!(tx.to_string())])
                .await
                .map_err(|e| ChainError::Wait(e.into_revert().message))?;

            if !value.is_null() {
                let receipt = Receipt::from_json(&value).map_err(ChainError::Malformed)?;
                debug!(tx = %tx, status = ?receipt.status, polls = attempt, "receipt received");
                return Ok(receipt);
            }

            tokio::time::sleep(self.config.poll.compute_delay(attempt)).await;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// COMPILE-TIME ASSERTIONS
// ════════════════════════════════════════════════════════════════════════════

const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn check() {
        assert_send_sync::<JsonRpcChain>();
    }
    let _ = check;
};
