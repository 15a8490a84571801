//! HTTP handlers.
//!
//! ```text
//! POST /api/store-hash ─► validate ─► DirectRegistrar ─► verifyFile
//!                                                     └─► storeFileHash + wait
//! GET  /api/health     ─► chain id probe
//! GET  /metrics        ─► Prometheus text
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use merchfund_adapter::{DirectRegistrar, HashRegistrar, RegistrarError};
use merchfund_chain::ChainClient;
use merchfund_common::cid::{is_valid_cid, short_cid};
use merchfund_common::relayer_api::{HealthResponse, StoreHashRequest, StoreHashResponse};
use merchfund_common::Address;
use tracing::{error, info, warn};

use crate::metrics::{RelayerMetrics, StoreOutcome};

/// Upper bound for the health probe.
const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub chain: Arc<dyn ChainClient>,
    pub registrar: Arc<dyn HashRegistrar>,
    pub signer: Address,
    pub metrics: Arc<RelayerMetrics>,
}

impl AppState {
    /// State that registers through `chain` with `signer` paying.
    pub fn new(chain: Arc<dyn ChainClient>, signer: Address, file_registry: Address) -> Self {
        let registrar = Arc::new(DirectRegistrar::new(chain.clone(), file_registry));
        Self {
            chain,
            registrar,
            signer,
            metrics: Arc::new(RelayerMetrics::new()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/store-hash", post(store_hash))
        .route("/api/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
}

/// POST /api/store-hash
pub async fn store_hash(
    State(state): State<AppState>,
    Json(req): Json<StoreHashRequest>,
) -> (StatusCode, Json<StoreHashResponse>) {
    let started = Instant::now();
    state.metrics.record_request();

    let (status, outcome, body) = process_store_hash(&state, &req).await;

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    state.metrics.record_response(status.as_u16(), outcome, latency_ms);
    (status, Json(body))
}

async fn process_store_hash(
    state: &AppState,
    req: &StoreHashRequest,
) -> (StatusCode, StoreOutcome, StoreHashResponse) {
    let bad_request = |msg: &str| {
        (
            StatusCode::BAD_REQUEST,
            StoreOutcome::Rejected,
            StoreHashResponse::failure(msg),
        )
    };

    let cid = req.cid.trim();
    if cid.is_empty() {
        return bad_request("cid is required");
    }
    if !is_valid_cid(cid) {
        return bad_request("cid is malformed");
    }
    let owner: Address = match req.user_address.trim().parse() {
        Ok(addr) => addr,
        Err(_) => return bad_request("userAddress is not a valid address"),
    };

    match state.registrar.register(cid, owner).await {
        Ok(reg) => {
            let outcome = if reg.already_registered {
                StoreOutcome::AlreadyRegistered
            } else {
                StoreOutcome::Registered
            };
            info!(
                cid = short_cid(cid),
                owner = %owner,
                already_registered = reg.already_registered,
                tx = ?reg.tx_hash,
                "store-hash served"
            );
            (
                StatusCode::OK,
                outcome,
                StoreHashResponse {
                    success: true,
                    transaction_hash: reg.tx_hash.map(|h| h.to_string()),
                    file_hash: Some(reg.file_hash),
                    already_registered: reg.already_registered,
                    error: None,
                },
            )
        }
        Err(RegistrarError::InvalidCid(c)) => {
            warn!(cid = %c, "registrar rejected cid");
            bad_request("cid is malformed")
        }
        Err(e) => {
            error!(cid = short_cid(cid), error = %e, "store-hash failed");
            (
                StatusCode::BAD_GATEWAY,
                StoreOutcome::Failed,
                StoreHashResponse::failure(e.to_string()),
            )
        }
    }
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let chain_reachable = matches!(
        tokio::time::timeout(HEALTH_PROBE_TIMEOUT, state.chain.chain_id()).await,
        Ok(Ok(_))
    );
    if !chain_reachable {
        warn!("health probe could not reach the chain");
    }
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            signer: state.signer.to_string(),
            chain_reachable,
        }),
    )
}

/// GET /metrics
pub async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert(
        "content-type",
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (StatusCode::OK, headers, state.metrics.to_prometheus())
}

const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn check() {
        assert_send_sync::<AppState>();
    }
    let _ = check;
};
