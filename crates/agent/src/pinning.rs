//! # Pinning Client
//!
//! Minimal client for a Pinata-compatible pinning API.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `pin_file` | `POST {api}/pinning/pinFileToIPFS` (multipart `file`) |
//! | `pin_json` | `POST {api}/pinning/pinJSONToIPFS` |
//! | `unpin` | `DELETE {api}/pinning/unpin/{cid}` |
//!
//! Every request carries `Authorization: Bearer <jwt>` and is bounded by a
//! 25 second client timeout.

use std::path::Path;
use std::time::Duration;

use merchfund_common::config::PinningConfig;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};

const PIN_TIMEOUT: Duration = Duration::from_secs(25);

#[derive(Debug, Error)]
pub enum PinningError {
    #[error("pinning JWT is not configured")]
    MissingJwt,

    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("pinning request failed: {0}")]
    Http(String),

    #[error("pinning service rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected pinning response: {0}")]
    Decode(String),
}

/// Pinned content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PinResult {
    #[serde(rename = "IpfsHash")]
    pub cid: String,
    #[serde(rename = "PinSize", default)]
    pub size: u64,
}

#[derive(Clone)]
pub struct PinningClient {
    api_url: String,
    gateway_url: String,
    jwt: String,
    client: Client,
}

impl PinningClient {
    pub fn new(
        api_url: impl Into<String>,
        gateway_url: impl Into<String>,
        jwt: impl Into<String>,
    ) -> Result<Self, PinningError> {
        let client = Client::builder()
            .timeout(PIN_TIMEOUT)
            .build()
            .map_err(|e| PinningError::Http(e.to_string()))?;
        Ok(Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            gateway_url: gateway_url.into().trim_end_matches('/').to_string(),
            jwt: jwt.into(),
            client,
        })
    }

    pub fn from_config(cfg: &PinningConfig) -> Result<Self, PinningError> {
        let jwt = cfg
            .jwt
            .as_deref()
            .filter(|j| !j.trim().is_empty())
            .ok_or(PinningError::MissingJwt)?;
        Self::new(&cfg.api_url, &cfg.gateway_url, jwt)
    }

    /// Public gateway URL of a CID.
    pub fn gateway_url(&self, cid: &str) -> String {
        format!("{}/{}", self.gateway_url, cid)
    }

    pub async fn pin_file(&self, path: &Path) -> Result<PinResult, PinningError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| PinningError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        debug!(file = %name, size = bytes.len(), "pinning file");

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(name.clone()))
            .text("pinataMetadata", json!({ "name": name }).to_string());

        let r = self
            .client
            .post(format!("{}/pinning/pinFileToIPFS", self.api_url))
            .bearer_auth(&self.jwt)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PinningError::Http(e.to_string()))?;
        let pinned: PinResult = decode(r).await?;
        info!(cid = %pinned.cid, file = %name, "file pinned");
        Ok(pinned)
    }

    pub async fn pin_json(&self, name: &str, content: &Value) -> Result<PinResult, PinningError> {
        let body = json!({
            "pinataContent": content,
            "pinataMetadata": { "name": name },
        });
        let r = self
            .client
            .post(format!("{}/pinning/pinJSONToIPFS", self.api_url))
            .bearer_auth(&self.jwt)
            .json(&body)
            .send()
            .await
            .map_err(|e| PinningError::Http(e.to_string()))?;
        let pinned: PinResult = decode(r).await?;
        info!(cid = %pinned.cid, name, "json pinned");
        Ok(pinned)
    }

    pub async fn unpin(&self, cid: &str) -> Result<(), PinningError> {
        let r = self
            .client
            .delete(format!("{}/pinning/unpin/{}", self.api_url, cid))
            .bearer_auth(&self.jwt)
            .send()
            .await
            .map_err(|e| PinningError::Http(e.to_string()))?;
        check_status(r).await?;
        info!(cid, "unpinned");
        Ok(())
    }
}

async fn check_status(r: Response) -> Result<Response, PinningError> {
    let status = r.status();
    if status.is_success() {
        return Ok(r);
    }
    let message = r.text().await.unwrap_or_default();
    Err(PinningError::Rejected {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: serde::de::DeserializeOwned>(r: Response) -> Result<T, PinningError> {
    check_status(r)
        .await?
        .json::<T>()
        .await
        .map_err(|e| PinningError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CID: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";

    fn client(server: &MockServer) -> PinningClient {
        PinningClient::new(server.uri(), "https://gw.example/ipfs/", "jwt-token").unwrap()
    }

    #[tokio::test]
    async fn pin_file_uploads_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pinning/pinFileToIPFS"))
            .and(header("authorization", "Bearer jwt-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "IpfsHash": CID,
                "PinSize": 11,
                "Timestamp": "2024-01-01T00:00:00Z",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("design.png");
        std::fs::write(&file, b"hello world").unwrap();

        let pinned = client(&server).pin_file(&file).await.unwrap();
        assert_eq!(pinned.cid, CID);
        assert_eq!(pinned.size, 11);
    }

    #[tokio::test]
    async fn pin_file_missing_path() {
        let server = MockServer::start().await;
        let err = client(&server)
            .pin_file(Path::new("/definitely/not/here.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, PinningError::Io { .. }));
    }

    #[tokio::test]
    async fn pin_json_wraps_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pinning/pinJSONToIPFS"))
            .and(wiremock::matchers::body_partial_json(json!({
                "pinataContent": { "title": "Clean Water" },
                "pinataMetadata": { "name": "campaign" },
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "IpfsHash": CID })))
            .mount(&server)
            .await;

        let pinned = client(&server)
            .pin_json("campaign", &json!({ "title": "Clean Water" }))
            .await
            .unwrap();
        assert_eq!(pinned.cid, CID);
        assert_eq!(pinned.size, 0);
    }

    #[tokio::test]
    async fn unpin_reports_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("/pinning/unpin/{}", CID)))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .mount(&server)
            .await;

        let err = client(&server).unpin(CID).await.unwrap_err();
        match err {
            PinningError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid token");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn gateway_url_joins_cid() {
        let c = PinningClient::new("https://api.example", "https://gw.example/ipfs/", "t").unwrap();
        assert_eq!(c.gateway_url(CID), format!("https://gw.example/ipfs/{}", CID));
    }

    #[test]
    fn config_without_jwt_is_rejected() {
        let cfg = PinningConfig::default();
        assert!(matches!(
            PinningClient::from_config(&cfg),
            Err(PinningError::MissingJwt)
        ));
    }
}
