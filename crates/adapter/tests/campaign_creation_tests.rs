//! Campaign creation protocol against the mock chain.

mod support;

use std::sync::Arc;

use merchfund_adapter::{AdapterError, ErrorKind, IdSource, NewCampaign};
use merchfund_chain::{MockCall, MockChain, MockWrite};
use merchfund_common::contracts::campaign_registry::{
    CAMPAIGN_COUNT, CREATE_CAMPAIGN, GET_ACTIVE_CAMPAIGNS, GET_CAMPAIGN,
};
use support::*;

fn new_campaign() -> NewCampaign {
    NewCampaign {
        title: "Clean Water".into(),
        description: "Wells for villages".into(),
        goal: 1_000,
        beneficiary: BENEFICIARY,
        designer: None,
    }
}

#[tokio::test]
async fn event_id_wins_over_counter() {
    let mock = Arc::new(MockChain::new());
    let c = contracts();
    mock.push_read(c.campaign_registry, &CAMPAIGN_COUNT, Ok(count(5)));
    mock.push_read(c.campaign_registry, &CAMPAIGN_COUNT, Ok(count(6)));
    mock.push_write(
        c.campaign_registry,
        &CREATE_CAMPAIGN,
        Ok(MockWrite::success().with_log(campaign_created_log(9))),
    );
    mock.push_read(c.campaign_registry, &GET_CAMPAIGN, Ok(campaign_tokens(9, true)));

    let created = market(&mock).create_campaign(&new_campaign()).await.unwrap();

    assert_eq!(created.campaign_id, 9);
    assert_eq!(created.resolved_by, IdSource::Event);
    assert!(created.verified);
    // Only the pre-submit snapshot; the counter tier never ran.
    assert_eq!(mock.calls_to("campaignCount").len(), 1);
    assert!(mock.calls_to("getActiveCampaigns").is_empty());
}

#[tokio::test]
async fn counter_diff_resolves_without_event() {
    let mock = Arc::new(MockChain::new());
    let c = contracts();
    mock.push_read(c.campaign_registry, &CAMPAIGN_COUNT, Ok(count(5)));
    mock.push_read(c.campaign_registry, &CAMPAIGN_COUNT, Ok(count(6)));
    mock.push_read(c.campaign_registry, &GET_CAMPAIGN, Ok(campaign_tokens(5, true)));

    let created = market(&mock).create_campaign(&new_campaign()).await.unwrap();

    assert_eq!(created.campaign_id, 5);
    assert_eq!(created.resolved_by, IdSource::Counter);
    assert!(created.verified);
}

#[tokio::test]
async fn active_list_is_last_resort() {
    let mock = Arc::new(MockChain::new());
    let c = contracts();
    mock.push_read(c.campaign_registry, &CAMPAIGN_COUNT, Ok(count(5)));
    mock.push_read(c.campaign_registry, &GET_ACTIVE_CAMPAIGNS, Ok(ids(&[1, 3, 5])));
    mock.push_read(c.campaign_registry, &GET_CAMPAIGN, Ok(campaign_tokens(5, true)));

    let created = market(&mock).create_campaign(&new_campaign()).await.unwrap();

    assert_eq!(created.campaign_id, 5);
    assert_eq!(created.resolved_by, IdSource::ActiveList);
}

#[tokio::test]
async fn no_tier_yields_unresolved() {
    let mock = Arc::new(MockChain::new());
    let c = contracts();
    mock.push_read(c.campaign_registry, &CAMPAIGN_COUNT, Ok(count(5)));
    mock.push_read(c.campaign_registry, &GET_ACTIVE_CAMPAIGNS, Ok(ids(&[])));

    let err = market(&mock).create_campaign(&new_campaign()).await.unwrap_err();

    assert!(matches!(err, AdapterError::CampaignIdUnresolved { .. }));
    assert!(mock.calls_to("getCampaign").is_empty());
}

#[tokio::test]
async fn reverted_receipt_fails_without_resolution() {
    let mock = Arc::new(MockChain::new());
    let c = contracts();
    mock.push_read(c.campaign_registry, &CAMPAIGN_COUNT, Ok(count(5)));
    mock.push_write(c.campaign_registry, &CREATE_CAMPAIGN, Ok(MockWrite::reverted()));

    let err = market(&mock).create_campaign(&new_campaign()).await.unwrap_err();

    let tx_hash = match err {
        AdapterError::CampaignCreationFailed { tx_hash } => tx_hash,
        other => panic!("unexpected error: {:?}", other),
    };
    let calls = mock.calls();
    assert_eq!(calls.last(), Some(&MockCall::Wait { tx: tx_hash }));
    assert_eq!(mock.calls_to("campaignCount").len(), 1);
    assert!(mock.calls_to("getActiveCampaigns").is_empty());
}

#[tokio::test]
async fn simulation_revert_is_translated_and_never_waits() {
    let mock = Arc::new(MockChain::new());
    let c = contracts();
    mock.push_read(c.campaign_registry, &CAMPAIGN_COUNT, Ok(count(5)));
    mock.push_write(
        c.campaign_registry,
        &CREATE_CAMPAIGN,
        Err(selector_revert([0x1f, 0x2a, 0x20, 0x05])),
    );

    let err = market(&mock).create_campaign(&new_campaign()).await.unwrap_err();

    assert_eq!(err.kind(), Some(&ErrorKind::TransferFailed));
    assert!(!mock.calls().iter().any(|c| matches!(c, MockCall::Wait { .. })));
}

#[tokio::test]
async fn verification_failure_is_not_fatal() {
    let mock = Arc::new(MockChain::new());
    let c = contracts();
    mock.push_read(c.campaign_registry, &CAMPAIGN_COUNT, Ok(count(2)));
    mock.push_read(c.campaign_registry, &CAMPAIGN_COUNT, Ok(count(3)));
    mock.push_read(c.campaign_registry, &GET_CAMPAIGN, Err(read_failure("node timeout")));

    let created = market(&mock).create_campaign(&new_campaign()).await.unwrap();

    assert_eq!(created.campaign_id, 2);
    assert!(!created.verified);
}

#[tokio::test]
async fn empty_read_back_is_unverified() {
    let mock = Arc::new(MockChain::new());
    let c = contracts();
    mock.push_read(c.campaign_registry, &CAMPAIGN_COUNT, Ok(count(2)));
    mock.push_read(c.campaign_registry, &CAMPAIGN_COUNT, Ok(count(3)));
    mock.push_read(c.campaign_registry, &GET_CAMPAIGN, Ok(empty_campaign_tokens()));

    let created = market(&mock).create_campaign(&new_campaign()).await.unwrap();

    assert_eq!(created.campaign_id, 2);
    assert!(!created.verified);
    assert_eq!(mock.calls_to("getCampaign").len(), 1);
}

#[tokio::test]
async fn snapshot_failure_defaults_to_zero() {
    let mock = Arc::new(MockChain::new());
    let c = contracts();
    mock.push_read(c.campaign_registry, &CAMPAIGN_COUNT, Err(read_failure("rate limited")));
    mock.push_read(c.campaign_registry, &CAMPAIGN_COUNT, Ok(count(1)));
    mock.push_read(c.campaign_registry, &GET_CAMPAIGN, Ok(campaign_tokens(0, true)));

    let created = market(&mock).create_campaign(&new_campaign()).await.unwrap();

    assert_eq!(created.campaign_id, 0);
    assert_eq!(created.resolved_by, IdSource::Counter);
}

#[tokio::test]
async fn designer_defaults_to_zero_address() {
    let mock = Arc::new(MockChain::new());
    let c = contracts();
    mock.push_read(c.campaign_registry, &CAMPAIGN_COUNT, Ok(count(0)));
    mock.push_write(
        c.campaign_registry,
        &CREATE_CAMPAIGN,
        Ok(MockWrite::success().with_log(campaign_created_log(0))),
    );
    mock.push_read(c.campaign_registry, &GET_CAMPAIGN, Ok(campaign_tokens(0, true)));

    market(&mock).create_campaign(&new_campaign()).await.unwrap();

    match &mock.calls_to("createCampaign")[0] {
        MockCall::Write { args, value, .. } => {
            assert_eq!(args[4], merchfund_common::Token::Address(merchfund_common::Address::ZERO));
            assert_eq!(*value, 0);
        }
        other => panic!("unexpected call: {:?}", other),
    }
}
