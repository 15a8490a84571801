//! # In-Memory Chain Client
//!
//! [`MockChain`] implements [`ChainClient`] without a node so adapter
//! protocols can be tested deterministically.
//!
//! ## Scripting
//!
//! Responses are queued per `(contract, function name)` and consumed FIFO.
//! The last queued response repeats once the queue is down to one entry,
//! so a single `push_read` acts as a fixed value.
//!
//! - Unscripted reads fail with `ChainError::Read`.
//! - Unscripted writes succeed and produce a successful receipt.
//! - [`MockWrite::unconfirmed`] sends the transaction but fails `wait`.
//!
//! Every call is recorded in a journal for ordering assertions.
//!
//! ## Thread Safety
//!
//! Uses `std::sync::Mutex`. Poisoned locks map to `ChainError` without
//! panicking.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use merchfund_common::{Address, Amount, Function, Token, TxHash};

use crate::client::ChainClient;
use crate::error::{ChainError, RevertData};
use crate::receipt::{Log, Receipt, TxStatus};

/// Scripted outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockWrite {
    pub status: TxStatus,
    pub logs: Vec<Log>,
    /// When set, `wait` for this transaction fails with `ChainError::Wait`.
    pub wait_error: Option<String>,
}

impl MockWrite {
    pub fn success() -> Self {
        Self {
            status: TxStatus::Success,
            logs: Vec::new(),
            wait_error: None,
        }
    }

    pub fn reverted() -> Self {
        Self {
            status: TxStatus::Reverted,
            logs: Vec::new(),
            wait_error: None,
        }
    }

    /// Submitted, but the receipt cannot be fetched.
    pub fn unconfirmed(reason: impl Into<String>) -> Self {
        Self {
            wait_error: Some(reason.into()),
            ..Self::success()
        }
    }

    pub fn with_log(mut self, log: Log) -> Self {
        self.logs.push(log);
        self
    }
}

/// Journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Read {
        contract: Address,
        function: &'static str,
        args: Vec<Token>,
    },
    Write {
        contract: Address,
        function: &'static str,
        args: Vec<Token>,
        value: Amount,
    },
    Wait {
        tx: TxHash,
    },
}

impl MockCall {
    pub fn function(&self) -> Option<&'static str> {
        match self {
            MockCall::Read { function, .. } | MockCall::Write { function, .. } => Some(*function),
            MockCall::Wait { .. } => None,
        }
    }
}

type Key = (Address, &'static str);

fn take_next<T: Clone>(queue: &mut VecDeque<T>) -> Option<T> {
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

/// Programmable chain client for tests.
pub struct MockChain {
    sender: Option<Address>,
    chain_id: u64,
    reads: Mutex<HashMap<Key, VecDeque<Result<Vec<Token>, ChainError>>>>,
    writes: Mutex<HashMap<Key, VecDeque<Result<MockWrite, ChainError>>>>,
    receipts: Mutex<HashMap<TxHash, Result<Receipt, ChainError>>>,
    journal: Mutex<Vec<MockCall>>,
    tx_counter: AtomicU64,
}

impl MockChain {
    /// Mock with a fixed sender and chain id 31337.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sender: Some(Address([0xAA; 20])),
            chain_id: 31337,
            reads: Mutex::new(HashMap::new()),
            writes: Mutex::new(HashMap::new()),
            receipts: Mutex::new(HashMap::new()),
            journal: Mutex::new(Vec::new()),
            tx_counter: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn with_sender(mut self, sender: Option<Address>) -> Self {
        self.sender = sender;
        self
    }

    /// Queue a read response. If the mutex is poisoned the response is dropped.
    pub fn push_read(
        &self,
        contract: Address,
        function: &Function,
        response: Result<Vec<Token>, ChainError>,
    ) {
        if let Ok(mut reads) = self.reads.lock() {
            reads
                .entry((contract, function.name))
                .or_default()
                .push_back(response);
        }
    }

    /// Queue a write outcome. If the mutex is poisoned the outcome is dropped.
    pub fn push_write(
        &self,
        contract: Address,
        function: &Function,
        outcome: Result<MockWrite, ChainError>,
    ) {
        if let Ok(mut writes) = self.writes.lock() {
            writes
                .entry((contract, function.name))
                .or_default()
                .push_back(outcome);
        }
    }

    /// Snapshot of every call made so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.journal.lock().map(|j| j.clone()).unwrap_or_default()
    }

    /// Journal entries for one function name.
    pub fn calls_to(&self, function: &str) -> Vec<MockCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.function() == Some(function))
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MockCall::Write { .. }))
            .count()
    }

    fn record(&self, call: MockCall) {
        if let Ok(mut journal) = self.journal.lock() {
            journal.push(call);
        }
    }

    fn next_hash(&self) -> TxHash {
        let n = self.tx_counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        let mut bytes = [0u8; 32];
        bytes[0] = 0xEE;
        bytes[24..].copy_from_slice(&n.to_be_bytes());
        TxHash(bytes)
    }
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainClient for MockChain {
    fn sender(&self) -> Option<Address> {
        self.sender
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        Ok(self.chain_id)
    }

    async fn read(
        &self,
        contract: Address,
        function: &Function,
        args: &[Token],
    ) -> Result<Vec<Token>, ChainError> {
        function.encode_call(args)?;
        self.record(MockCall::Read {
            contract,
            function: function.name,
            args: args.to_vec(),
        });

        let mut reads = self
            .reads
            .lock()
            .map_err(|e| ChainError::Read(RevertData::new(format!("mutex poisoned: {}", e))))?;

        reads
            .get_mut(&(contract, function.name))
            .and_then(take_next)
            .unwrap_or_else(|| {
                Err(ChainError::Read(RevertData::new(format!(
                    "no mock response for {} on {}",
                    function.name, contract
                ))))
            })
    }

    async fn write(
        &self,
        contract: Address,
        function: &Function,
        args: &[Token],
        value: Amount,
    ) -> Result<TxHash, ChainError> {
        if self.sender.is_none() {
            return Err(ChainError::NoSender);
        }
        function.encode_call(args)?;
        self.record(MockCall::Write {
            contract,
            function: function.name,
            args: args.to_vec(),
            value,
        });

        let outcome = {
            let mut writes = self.writes.lock().map_err(|e| {
                ChainError::Write(RevertData::new(format!("mutex poisoned: {}", e)))
            })?;
            writes
                .get_mut(&(contract, function.name))
                .and_then(take_next)
                .unwrap_or_else(|| Ok(MockWrite::success()))
        }?;

        let tx_hash = self.next_hash();
        let receipt = match outcome.wait_error {
            Some(reason) => Err(ChainError::Wait(reason)),
            None => Ok(Receipt {
                tx_hash,
                block_number: self.tx_counter.load(Ordering::Relaxed),
                status: outcome.status,
                logs: outcome.logs,
            }),
        };

        let mut receipts = self
            .receipts
            .lock()
            .map_err(|e| ChainError::Write(RevertData::new(format!("mutex poisoned: {}", e))))?;
        receipts.insert(tx_hash, receipt);
        Ok(tx_hash)
    }

    async fn wait(&self, tx: TxHash) -> Result<Receipt, ChainError> {
        self.record(MockCall::Wait { tx });
        let receipts = self
            .receipts
            .lock()
            .map_err(|e| ChainError::Wait(format!("mutex poisoned: {}", e)))?;
        receipts
            .get(&tx)
            .cloned()
            .unwrap_or_else(|| Err(ChainError::Wait(format!("unknown transaction {}", tx))))
    }
}

const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn check() {
        assert_send_sync::<MockChain>();
    }
    let _ = check;
};

#[cfg(test)]
mod tests {
    use super::*;
    use merchfund_common::contracts::campaign_registry::{CAMPAIGN_COUNT, DEACTIVATE_CAMPAIGN};

    const REGISTRY: Address = Address([0x01; 20]);

    #[tokio::test]
    async fn reads_are_fifo_and_last_sticks() {
        let mock = MockChain::new();
        mock.push_read(REGISTRY, &CAMPAIGN_COUNT, Ok(vec![Token::Uint(5)]));
        mock.push_read(REGISTRY, &CAMPAIGN_COUNT, Ok(vec![Token::Uint(6)]));

        let first = mock.read(REGISTRY, &CAMPAIGN_COUNT, &[]).await.unwrap();
        let second = mock.read(REGISTRY, &CAMPAIGN_COUNT, &[]).await.unwrap();
        let third = mock.read(REGISTRY, &CAMPAIGN_COUNT, &[]).await.unwrap();
        assert_eq!(first, vec![Token::Uint(5)]);
        assert_eq!(second, vec![Token::Uint(6)]);
        assert_eq!(third, vec![Token::Uint(6)]);
    }

    #[tokio::test]
    async fn unscripted_read_fails() {
        let mock = MockChain::new();
        let err = mock.read(REGISTRY, &CAMPAIGN_COUNT, &[]).await.unwrap_err();
        assert!(matches!(err, ChainError::Read(_)));
    }

    #[tokio::test]
    async fn unscripted_write_succeeds_with_receipt() {
        let mock = MockChain::new();
        let tx = mock
            .write(REGISTRY, &DEACTIVATE_CAMPAIGN, &[Token::Uint(3)], 0)
            .await
            .unwrap();
        let receipt = mock.wait(tx).await.unwrap();
        assert!(receipt.is_success());
        assert_eq!(receipt.tx_hash, tx);
        assert_eq!(mock.write_count(), 1);
    }

    #[tokio::test]
    async fn unconfirmed_write_fails_wait() {
        let mock = MockChain::new();
        mock.push_write(
            REGISTRY,
            &DEACTIVATE_CAMPAIGN,
            Ok(MockWrite::unconfirmed("receipt poll: 502 bad gateway")),
        );
        let tx = mock
            .write(REGISTRY, &DEACTIVATE_CAMPAIGN, &[Token::Uint(3)], 0)
            .await
            .unwrap();
        let err = mock.wait(tx).await.unwrap_err();
        assert_eq!(err, ChainError::Wait("receipt poll: 502 bad gateway".to_string()));
        assert_eq!(mock.write_count(), 1);
    }

    #[tokio::test]
    async fn write_rejects_wrong_argument_types() {
        let mock = MockChain::new();
        let err = mock
            .write(REGISTRY, &DEACTIVATE_CAMPAIGN, &[Token::Bool(true)], 0)
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Abi(_)));
        assert_eq!(mock.write_count(), 0);
    }

    #[tokio::test]
    async fn write_without_sender_fails() {
        let mock = MockChain::new().with_sender(None);
        let err = mock
            .write(REGISTRY, &DEACTIVATE_CAMPAIGN, &[Token::Uint(3)], 0)
            .await
            .unwrap_err();
        assert_eq!(err, ChainError::NoSender);
    }

    #[tokio::test]
    async fn journal_keeps_order() {
        let mock = MockChain::new();
        mock.push_read(REGISTRY, &CAMPAIGN_COUNT, Ok(vec![Token::Uint(1)]));
        let _ = mock.read(REGISTRY, &CAMPAIGN_COUNT, &[]).await;
        let tx = mock
            .write(REGISTRY, &DEACTIVATE_CAMPAIGN, &[Token::Uint(0)], 0)
            .await
            .unwrap();
        let _ = mock.wait(tx).await;

        let calls = mock.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].function(), Some("campaignCount"));
        assert_eq!(calls[1].function(), Some("deactivateCampaign"));
        assert_eq!(calls[2], MockCall::Wait { tx });
    }
}
