//! Relayer entry point.

use std::sync::Arc;

use anyhow::Context;
use merchfund_chain::{ChainClient, JsonRpcChain};
use merchfund_relayer::{router, AppState, RelayerConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cfg = RelayerConfig::from_env().context("relayer configuration")?;
    info!(
        rpc = %cfg.rpc_url,
        signer = %cfg.signer,
        file_registry = %cfg.file_registry,
        "relayer starting"
    );

    let chain = JsonRpcChain::new(cfg.json_rpc()).context("chain client")?;
    let chain: Arc<dyn ChainClient> = Arc::new(chain);
    match chain.chain_id().await {
        Ok(id) => info!(chain_id = id, "chain reachable"),
        Err(e) => error!(error = %e, "chain not reachable at startup"),
    }

    let app = router(AppState::new(chain, cfg.signer, cfg.file_registry));

    let listener = tokio::net::TcpListener::bind(cfg.listen_addr)
        .await
        .with_context(|| format!("bind {}", cfg.listen_addr))?;
    info!(listen_addr = %cfg.listen_addr, "relayer listening");

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!(error = %e, "server error");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    info!("relayer shutdown complete");
    Ok(())
}
