//! Wire types of the relayer HTTP API, shared by the service and its client.

use serde::{Deserialize, Serialize};

/// `POST /api/store-hash` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreHashRequest {
    pub cid: String,
    /// Owner recorded against the file. Kept as text so the service can
    /// answer malformed values with a 400 instead of a body rejection.
    pub user_address: String,
}

/// `POST /api/store-hash` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreHashResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_hash: Option<String>,
    #[serde(default)]
    pub already_registered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StoreHashResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            transaction_hash: None,
            file_hash: None,
            already_registered: false,
            error: Some(message.into()),
        }
    }
}

/// `GET /api/health` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub signer: String,
    pub chain_reachable: bool,
}
