//! # Configuration
//!
//! TOML file configuration with `MERCHFUND_*` environment overrides.
//!
//! ## Example
//!
//! ```toml
//! rpc_url = "http://127.0.0.1:8545"
//! sender = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
//! verify_delay_ms = 1000
//!
//! [contracts]
//! campaign_registry = "0x5fbdb2315678afecb367f032d93f642f64180aa3"
//! # ... one entry per contract
//!
//! [pinning]
//! api_url = "https://api.pinata.cloud"
//! ```
//!
//! ## Environment Overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `MERCHFUND_RPC_URL` | `rpc_url` |
//! | `MERCHFUND_RPC_AUTH_TOKEN` | `rpc_auth_token` |
//! | `MERCHFUND_SENDER` | `sender` |
//! | `MERCHFUND_RPC_TIMEOUT_MS` | `rpc_timeout_ms` |
//! | `MERCHFUND_RECEIPT_POLL_MS` | `receipt_poll_ms` |
//! | `MERCHFUND_VERIFY_DELAY_MS` | `verify_delay_ms` |
//! | `MERCHFUND_RELAYER_URL` | `relayer_url` |
//! | `MERCHFUND_PINNING_API_URL` | `pinning.api_url` |
//! | `MERCHFUND_PINNING_JWT` | `pinning.jwt` |
//! | `MERCHFUND_<CONTRACT>` | `contracts.<contract>` (e.g. `MERCHFUND_DONATION_VAULT`) |

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::contracts::ContractAddresses;
use crate::types::Address;

/// Configuration loading or validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override could not be parsed.
    #[error("{key} invalid: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("contract addresses not configured: {0}")]
    MissingContracts(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// IPFS pinning service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinningConfig {
    pub api_url: String,
    pub gateway_url: String,
    pub jwt: Option<String>,
}

impl Default for PinningConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.pinata.cloud".to_string(),
            gateway_url: "https://gateway.pinata.cloud/ipfs".to_string(),
            jwt: None,
        }
    }
}

/// Client configuration shared by the CLI and embedding applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON-RPC endpoint of the chain node or signing proxy.
    pub rpc_url: String,

    /// Optional bearer token for the RPC endpoint.
    pub rpc_auth_token: Option<String>,

    /// Account used for `eth_sendTransaction`. Read-only usage may omit it.
    pub sender: Option<Address>,

    pub rpc_timeout_ms: u64,

    /// Initial receipt poll interval.
    pub receipt_poll_ms: u64,

    /// Delay before reading back a freshly created campaign.
    pub verify_delay_ms: u64,

    /// Relayer base URL. When absent, file hashes are registered directly.
    pub relayer_url: Option<String>,

    pub contracts: ContractAddresses,

    pub pinning: PinningConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            rpc_auth_token: None,
            sender: None,
            rpc_timeout_ms: 30_000,
            receipt_poll_ms: 500,
            verify_delay_ms: 1_000,
            relayer_url: None,
            contracts: ContractAddresses::default(),
            pinning: PinningConfig::default(),
        }
    }
}

fn parse_env<T: FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        })
}

impl Config {
    /// Load from a TOML file. Missing keys take their defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&text)?;
        debug!(path = %path.display(), "loaded config file");
        Ok(cfg)
    }

    /// Apply `MERCHFUND_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("MERCHFUND_RPC_URL") {
            self.rpc_url = v.trim().to_string();
        }
        if let Some(v) = get("MERCHFUND_RPC_AUTH_TOKEN") {
            self.rpc_auth_token = Some(v);
        }
        if let Some(v) = get("MERCHFUND_SENDER") {
            self.sender = Some(parse_env("MERCHFUND_SENDER", v)?);
        }
        if let Some(v) = get("MERCHFUND_RPC_TIMEOUT_MS") {
            self.rpc_timeout_ms = parse_env("MERCHFUND_RPC_TIMEOUT_MS", v)?;
        }
        if let Some(v) = get("MERCHFUND_RECEIPT_POLL_MS") {
            self.receipt_poll_ms = parse_env("MERCHFUND_RECEIPT_POLL_MS", v)?;
        }
        if let Some(v) = get("MERCHFUND_VERIFY_DELAY_MS") {
            self.verify_delay_ms = parse_env("MERCHFUND_VERIFY_DELAY_MS", v)?;
        }
        if let Some(v) = get("MERCHFUND_RELAYER_URL") {
            self.relayer_url = Some(v.trim().to_string());
        }
        if let Some(v) = get("MERCHFUND_PINNING_API_URL") {
            self.pinning.api_url = v.trim().to_string();
        }
        if let Some(v) = get("MERCHFUND_PINNING_JWT") {
            self.pinning.jwt = Some(v);
        }

        let c = &mut self.contracts;
        let contract_slots: [(&str, &mut Address); 7] = [
            ("MERCHFUND_CAMPAIGN_REGISTRY", &mut c.campaign_registry),
            ("MERCHFUND_DONATION_VAULT", &mut c.donation_vault),
            ("MERCHFUND_DESIGN_MARKETPLACE", &mut c.design_marketplace),
            ("MERCHFUND_FILE_REGISTRY", &mut c.file_registry),
            ("MERCHFUND_ADMIN_REGISTRY", &mut c.admin_registry),
            ("MERCHFUND_NGO_REGISTRY", &mut c.ngo_registry),
            ("MERCHFUND_DESIGNER_REGISTRY", &mut c.designer_registry),
        ];
        for (key, slot) in contract_slots {
            if let Some(v) = get(key) {
                *slot = parse_env(key, v)?;
            }
        }

        Ok(())
    }

    /// Check the values the adapter cannot work without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "rpc_url must be an http(s) URL, got '{}'",
                self.rpc_url
            )));
        }
        if self.rpc_timeout_ms == 0 {
            return Err(ConfigError::Invalid("rpc_timeout_ms must be > 0".to_string()));
        }
        let missing = self.contracts.missing();
        if !missing.is_empty() {
            return Err(ConfigError::MissingContracts(missing.join(", ")));
        }
        Ok(())
    }

    /// Sender account, required for any write.
    pub fn require_sender(&self) -> Result<Address, ConfigError> {
        self.sender
            .ok_or_else(|| ConfigError::Invalid("sender is required for transactions".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn full_contracts_toml() -> String {
        [
            "campaign_registry",
            "donation_vault",
            "design_marketplace",
            "file_registry",
            "admin_registry",
            "ngo_registry",
            "designer_registry",
        ]
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{} = \"0x{}\"\n", name, format!("{:02x}", i + 1).repeat(20)))
        .collect()
    }

    #[test]
    fn test_default_config() {
        let def = Config::default();
        assert_eq!(def.verify_delay_ms, 1_000);
        assert!(def.sender.is_none());
        assert!(matches!(def.validate(), Err(ConfigError::MissingContracts(_))));
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::NamedTempFile::new().expect("temp file");
        let toml = format!(
            "rpc_url = \"http://10.0.0.5:8545\"\n\
             sender = \"0x70997970C51812dc3A010C7d01b50e0d17dc79C8\"\n\
             verify_delay_ms = 250\n\
             \n[contracts]\n{}\n[pinning]\njwt = \"secret\"\n",
            full_contracts_toml()
        );
        let mut f = tmp.reopen().expect("reopen");
        write!(f, "{}", toml).expect("write");

        let cfg = Config::load_from_file(tmp.path()).expect("load");
        assert_eq!(cfg.rpc_url, "http://10.0.0.5:8545");
        assert_eq!(cfg.verify_delay_ms, 250);
        assert_eq!(cfg.receipt_poll_ms, 500);
        assert_eq!(cfg.pinning.jwt.as_deref(), Some("secret"));
        assert_eq!(cfg.pinning.api_url, "https://api.pinata.cloud");
        assert_eq!(cfg.contracts.donation_vault, Address([0x02; 20]));
        assert!(cfg.validate().is_ok());
        assert!(cfg.require_sender().is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load_from_file("/nonexistent/merchfund.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("MERCHFUND_RPC_URL", "https://rpc.example"),
            ("MERCHFUND_VERIFY_DELAY_MS", "5"),
            ("MERCHFUND_FILE_REGISTRY", "0x0303030303030303030303030303030303030303"),
            ("MERCHFUND_RELAYER_URL", "   "),
        ]
        .into_iter()
        .collect();

        let mut cfg = Config::default();
        cfg.apply_env_from(|k| env.get(k).map(|v| v.to_string()))
            .expect("apply");
        assert_eq!(cfg.rpc_url, "https://rpc.example");
        assert_eq!(cfg.verify_delay_ms, 5);
        assert_eq!(cfg.contracts.file_registry, Address([0x03; 20]));
        assert!(cfg.relayer_url.is_none());
    }

    #[test]
    fn test_env_invalid_value() {
        let mut cfg = Config::default();
        let err = cfg
            .apply_env_from(|k| (k == "MERCHFUND_SENDER").then(|| "0x1234".to_string()))
            .unwrap_err();
        match err {
            ConfigError::InvalidValue { key, value } => {
                assert_eq!(key, "MERCHFUND_SENDER");
                assert_eq!(value, "0x1234");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let cfg = Config {
            rpc_url: "ws://node".to_string(),
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }
}
