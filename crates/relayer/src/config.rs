//! Relayer configuration from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `RELAYER_LISTEN_ADDR` | `127.0.0.1:3001` |
//! | `RELAYER_RPC_URL` | `http://127.0.0.1:8545` |
//! | `RELAYER_SIGNER` | required |
//! | `RELAYER_FILE_REGISTRY` | required |
//! | `RELAYER_RPC_AUTH_TOKEN` | none |
//! | `RELAYER_RPC_TIMEOUT_MS` | `30000` |

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use merchfund_chain::{JsonRpcConfig, PollConfig};
use merchfund_common::{Address, ConfigError};

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3001";
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_RPC_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayerConfig {
    pub listen_addr: SocketAddr,
    pub rpc_url: String,
    pub rpc_auth_token: Option<String>,
    /// Server-held account that pays for registrations.
    pub signer: Address,
    pub file_registry: Address,
    pub rpc_timeout_ms: u64,
}

impl RelayerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| {
            get(key).ok_or_else(|| ConfigError::Invalid(format!("{} is not set", key)))
        };

        let listen_addr = parse(
            "RELAYER_LISTEN_ADDR",
            get("RELAYER_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
        )?;
        let signer: Address = parse("RELAYER_SIGNER", required("RELAYER_SIGNER")?)?;
        let file_registry: Address =
            parse("RELAYER_FILE_REGISTRY", required("RELAYER_FILE_REGISTRY")?)?;
        if file_registry.is_zero() {
            return Err(ConfigError::MissingContracts("file_registry".to_string()));
        }
        let rpc_timeout_ms = match get("RELAYER_RPC_TIMEOUT_MS") {
            Some(v) => parse("RELAYER_RPC_TIMEOUT_MS", v)?,
            None => DEFAULT_RPC_TIMEOUT_MS,
        };

        Ok(Self {
            listen_addr,
            rpc_url: get("RELAYER_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            rpc_auth_token: get("RELAYER_RPC_AUTH_TOKEN"),
            signer,
            file_registry,
            rpc_timeout_ms,
        })
    }

    pub fn json_rpc(&self) -> JsonRpcConfig {
        JsonRpcConfig {
            rpc_url: self.rpc_url.clone(),
            auth_token: self.rpc_auth_token.clone(),
            timeout_ms: self.rpc_timeout_ms,
            sender: Some(self.signer),
            poll: PollConfig::default(),
        }
    }
}

fn parse<T: FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SIGNER: &str = "0x00000000000000000000000000000000000000aa";
    const REGISTRY: &str = "0x0000000000000000000000000000000000000004";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_applied() {
        let cfg = RelayerConfig::from_lookup(lookup(&[
            ("RELAYER_SIGNER", SIGNER),
            ("RELAYER_FILE_REGISTRY", REGISTRY),
        ]))
        .unwrap();
        assert_eq!(cfg.listen_addr.to_string(), DEFAULT_LISTEN_ADDR);
        assert_eq!(cfg.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(cfg.rpc_auth_token, None);
        assert_eq!(cfg.signer.to_string(), SIGNER);
        assert_eq!(cfg.json_rpc().sender, Some(cfg.signer));
    }

    #[test]
    fn overrides_applied() {
        let cfg = RelayerConfig::from_lookup(lookup(&[
            ("RELAYER_SIGNER", SIGNER),
            ("RELAYER_FILE_REGISTRY", REGISTRY),
            ("RELAYER_LISTEN_ADDR", "0.0.0.0:8080"),
            ("RELAYER_RPC_URL", "http://node:8545"),
            ("RELAYER_RPC_AUTH_TOKEN", "secret"),
            ("RELAYER_RPC_TIMEOUT_MS", "5000"),
        ]))
        .unwrap();
        assert_eq!(cfg.listen_addr.port(), 8080);
        assert_eq!(cfg.rpc_url, "http://node:8545");
        assert_eq!(cfg.rpc_auth_token.as_deref(), Some("secret"));
        assert_eq!(cfg.rpc_timeout_ms, 5000);
    }

    #[test]
    fn signer_required() {
        let err = RelayerConfig::from_lookup(lookup(&[("RELAYER_FILE_REGISTRY", REGISTRY)]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_values_rejected() {
        let err = RelayerConfig::from_lookup(lookup(&[
            ("RELAYER_SIGNER", "0x1234"),
            ("RELAYER_FILE_REGISTRY", REGISTRY),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "RELAYER_SIGNER"));

        let err = RelayerConfig::from_lookup(lookup(&[
            ("RELAYER_SIGNER", SIGNER),
            ("RELAYER_FILE_REGISTRY", REGISTRY),
            ("RELAYER_LISTEN_ADDR", "nowhere"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn zero_registry_rejected() {
        let err = RelayerConfig::from_lookup(lookup(&[
            ("RELAYER_SIGNER", SIGNER),
            ("RELAYER_FILE_REGISTRY", "0x0000000000000000000000000000000000000000"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingContracts(_)));
    }
}
