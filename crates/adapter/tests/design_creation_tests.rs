//! Design creation with the file re-registration retry.

mod support;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use merchfund_adapter::{
    AdapterError, ErrorKind, HashRegistrar, NewDesign, Registration, RegistrarError,
};
use merchfund_chain::{ChainError, MockCall, MockChain, MockWrite, RevertData};
use merchfund_common::contracts::design_marketplace::{CREATE_DESIGN, DESIGN_COUNT};
use merchfund_common::contracts::file_registry::VERIFY_FILE;
use merchfund_common::{Address, Token};
use support::*;

fn new_design() -> NewDesign {
    NewDesign {
        campaign_id: 1,
        name: "Wave Tee".into(),
        price: 20,
        file_cid: FILE_CID.into(),
        preview_cid: PREVIEW_CID.into(),
    }
}

fn not_registered() -> ChainError {
    ChainError::Write(RevertData::new("execution reverted: file hash not registered"))
}

/// Registrar that records calls and optionally fails.
struct RecordingRegistrar {
    calls: Mutex<Vec<(String, Address)>>,
    fail: bool,
}

impl RecordingRegistrar {
    fn new(fail: bool) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail,
        }
    }

    fn cids(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }
}

#[async_trait]
impl HashRegistrar for RecordingRegistrar {
    async fn register(&self, cid: &str, owner: Address) -> Result<Registration, RegistrarError> {
        self.calls.lock().unwrap().push((cid.to_string(), owner));
        if self.fail {
            return Err(RegistrarError::Http("connection refused".into()));
        }
        Ok(Registration {
            cid: cid.to_string(),
            file_hash: merchfund_common::cid::file_hash_hex(cid),
            tx_hash: None,
            already_registered: false,
        })
    }
}

#[tokio::test]
async fn first_try_success_resolves_event_id() {
    let mock = Arc::new(MockChain::new());
    let c = contracts();
    mock.push_read(c.design_marketplace, &DESIGN_COUNT, Ok(count(4)));
    mock.push_write(
        c.design_marketplace,
        &CREATE_DESIGN,
        Ok(MockWrite::success().with_log(design_created_log(4, 1))),
    );

    let created = market(&mock).create_design(&new_design()).await.unwrap();

    assert_eq!(created.design_id, Some(4));
    assert!(!created.retried);
    assert!(created.registered.is_empty());
    assert!(mock.calls_to("verifyFile").is_empty());
}

#[tokio::test]
async fn counter_identifies_design_without_event() {
    let mock = Arc::new(MockChain::new());
    let c = contracts();
    mock.push_read(c.design_marketplace, &DESIGN_COUNT, Ok(count(4)));
    mock.push_read(c.design_marketplace, &DESIGN_COUNT, Ok(count(5)));

    let created = market(&mock).create_design(&new_design()).await.unwrap();

    assert_eq!(created.design_id, Some(4));
}

#[tokio::test]
async fn missing_file_is_registered_then_retried_once() {
    let mock = Arc::new(MockChain::new());
    let c = contracts();
    mock.push_read(c.design_marketplace, &DESIGN_COUNT, Ok(count(0)));
    mock.push_write(c.design_marketplace, &CREATE_DESIGN, Err(not_registered()));
    mock.push_write(
        c.design_marketplace,
        &CREATE_DESIGN,
        Ok(MockWrite::success().with_log(design_created_log(0, 1))),
    );
    // probe(file), registrar check(file), probe(preview)
    mock.push_read(c.file_registry, &VERIFY_FILE, Ok(flag(false)));
    mock.push_read(c.file_registry, &VERIFY_FILE, Ok(flag(false)));
    mock.push_read(c.file_registry, &VERIFY_FILE, Ok(flag(true)));

    let created = market(&mock).create_design(&new_design()).await.unwrap();

    assert!(created.retried);
    assert_eq!(created.design_id, Some(0));
    assert_eq!(created.registered, vec![FILE_CID.to_string()]);
    assert_eq!(mock.calls_to("createDesign").len(), 2);

    let stores = mock.calls_to("storeFileHash");
    assert_eq!(stores.len(), 1);
    match &stores[0] {
        MockCall::Write { contract, args, .. } => {
            assert_eq!(*contract, c.file_registry);
            assert_eq!(
                args,
                &vec![Token::String(FILE_CID.into()), Token::Address(Address([0xAA; 20]))]
            );
        }
        other => panic!("unexpected call: {:?}", other),
    }
}

#[tokio::test]
async fn second_failure_is_returned_translated() {
    let mock = Arc::new(MockChain::new());
    let c = contracts();
    mock.push_read(c.design_marketplace, &DESIGN_COUNT, Ok(count(0)));
    mock.push_write(
        c.design_marketplace,
        &CREATE_DESIGN,
        Err(selector_revert([0x2c, 0x06, 0x7c, 0xd7])),
    );
    mock.push_read(c.file_registry, &VERIFY_FILE, Ok(flag(true)));

    let err = market(&mock).create_design(&new_design()).await.unwrap_err();

    assert_eq!(err.kind(), Some(&ErrorKind::CampaignInactive));
    assert_eq!(mock.calls_to("createDesign").len(), 2);
    assert!(mock.calls_to("storeFileHash").is_empty());
}

#[tokio::test]
async fn registration_failure_still_retries() {
    let mock = Arc::new(MockChain::new());
    let c = contracts();
    mock.push_read(c.design_marketplace, &DESIGN_COUNT, Ok(count(0)));
    mock.push_write(c.design_marketplace, &CREATE_DESIGN, Err(not_registered()));
    mock.push_write(c.design_marketplace, &CREATE_DESIGN, Ok(MockWrite::success()));
    mock.push_read(c.file_registry, &VERIFY_FILE, Ok(flag(false)));
    let registrar = Arc::new(RecordingRegistrar::new(true));

    let created = market(&mock)
        .with_registrar(registrar.clone())
        .create_design(&new_design())
        .await
        .unwrap();

    assert!(created.retried);
    assert!(created.registered.is_empty());
    assert_eq!(registrar.cids(), vec![FILE_CID.to_string(), PREVIEW_CID.to_string()]);
    assert_eq!(mock.calls_to("createDesign").len(), 2);
}

#[tokio::test]
async fn verify_failure_counts_as_missing() {
    let mock = Arc::new(MockChain::new());
    let c = contracts();
    mock.push_read(c.design_marketplace, &DESIGN_COUNT, Ok(count(0)));
    mock.push_write(c.design_marketplace, &CREATE_DESIGN, Err(not_registered()));
    mock.push_write(c.design_marketplace, &CREATE_DESIGN, Ok(MockWrite::success()));
    let registrar = Arc::new(RecordingRegistrar::new(false));

    let created = market(&mock)
        .with_registrar(registrar.clone())
        .create_design(&new_design())
        .await
        .unwrap();

    assert_eq!(created.registered.len(), 2);
    assert_eq!(registrar.cids().len(), 2);
}

#[tokio::test]
async fn transport_failure_is_not_retried() {
    let mock = Arc::new(MockChain::new());
    let c = contracts();
    mock.push_read(c.design_marketplace, &DESIGN_COUNT, Ok(count(0)));
    mock.push_write(
        c.design_marketplace,
        &CREATE_DESIGN,
        Err(ChainError::Malformed("bad json".into())),
    );

    let err = market(&mock).create_design(&new_design()).await.unwrap_err();

    assert!(matches!(err, AdapterError::Chain(_)));
    assert_eq!(mock.calls_to("createDesign").len(), 1);
    assert!(mock.calls_to("verifyFile").is_empty());
}

#[tokio::test]
async fn invalid_cid_rejected_locally() {
    let mock = Arc::new(MockChain::new());
    let mut design = new_design();
    design.file_cid = "not a cid".into();

    let err = market(&mock).create_design(&design).await.unwrap_err();

    assert!(matches!(err, AdapterError::InvalidInput(_)));
    assert!(mock.calls().is_empty());
}
