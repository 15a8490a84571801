//! Configuration loading and client construction for commands.
//!
//! Resolution order: built-in defaults, then the `--config` TOML file, then
//! `MERCHFUND_*` environment variables (a `.env` file is loaded first).

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use merchfund_adapter::{AdapterConfig, Marketplace, RelayerRegistrar};
use merchfund_chain::{JsonRpcChain, JsonRpcConfig};
use merchfund_common::{Address, Config};
use serde::Serialize;
use tracing::debug;

/// Everything a command needs.
pub struct Context {
    pub config: Config,
    pub market: Marketplace,
    pub json: bool,
}

impl Context {
    pub fn build(config_path: Option<&Path>, json: bool) -> Result<Self> {
        let config = load_config(config_path)?;
        let market = build_marketplace(&config)?;
        Ok(Self {
            config,
            market,
            json,
        })
    }

    /// Account for writes; also the default subject of `roles`.
    pub fn sender(&self) -> Result<Address> {
        Ok(self.config.require_sender()?)
    }

    /// Print `value` as JSON, or run `table` otherwise.
    pub fn emit<T: Serialize>(&self, value: &T, table: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            table(value);
        }
        Ok(())
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(p) => Config::load_from_file(p)
            .with_context(|| format!("loading config from {}", p.display()))?,
        None => Config::default(),
    };
    config.apply_env().context("applying environment overrides")?;
    config.validate()?;
    Ok(config)
}

/// Marketplace over JSON-RPC; registers file hashes through the relayer
/// when one is configured.
pub fn build_marketplace(config: &Config) -> Result<Marketplace> {
    let chain = JsonRpcChain::new(JsonRpcConfig::from(config)).context("creating chain client")?;
    let mut market = Marketplace::new(Arc::new(chain), config.contracts)
        .with_config(AdapterConfig::from(config));

    if let Some(url) = config.relayer_url.as_deref() {
        debug!(relayer = url, "using relayer for file registration");
        market = market.with_registrar(Arc::new(RelayerRegistrar::new(url)?));
    }
    Ok(market)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn config_file_without_contracts_fails_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rpc_url = \"http://localhost:8545\"").unwrap();
        let err = Config::load_from_file(file.path())
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("campaign_registry"));
    }

    #[test]
    fn marketplace_picks_up_verify_delay() {
        let mut config = Config::default();
        config.verify_delay_ms = 250;
        config.relayer_url = Some("http://127.0.0.1:3001".to_string());
        let market = build_marketplace(&config).unwrap();
        assert_eq!(market.config().verify_delay.as_millis(), 250);
    }
}
