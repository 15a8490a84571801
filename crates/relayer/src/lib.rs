//! # merchfund Relayer
//!
//! HTTP service that anchors content identifiers in the FileRegistry with a
//! server-held account, so uploaders need not pay for registration.
//!
//! ## Endpoints
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST /api/store-hash` | register a CID for `userAddress` |
//! | `GET /api/health` | liveness, signer and chain reachability |
//! | `GET /metrics` | Prometheus metrics |
//!
//! ## Status Codes
//!
//! - 200: registered, or already registered (`alreadyRegistered: true`)
//! - 400: empty or malformed CID, malformed address
//! - 502: chain failure or reverted registration

pub mod config;
pub mod handlers;
pub mod metrics;

pub use config::RelayerConfig;
pub use handlers::{router, AppState};
pub use metrics::RelayerMetrics;
