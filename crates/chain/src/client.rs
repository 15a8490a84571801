//! Chain client abstraction.

use async_trait::async_trait;
use merchfund_common::{Address, Amount, Function, Token, TxHash};

use crate::error::ChainError;
use crate::receipt::Receipt;

/// Async access to contract state and transactions.
///
/// The trait is object-safe and `Send + Sync` so one client can be shared
/// behind an `Arc<dyn ChainClient>` by every adapter call.
///
/// ## Contract
///
/// - `read` never submits anything.
/// - `write` simulates before submitting and never submits a call whose
///   simulation failed.
/// - `wait` blocks until the node reports inclusion; it enforces no
///   deadline of its own.
/// - Implementations do not retry writes.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Account transactions are sent from, if any.
    fn sender(&self) -> Option<Address>;

    /// Chain id reported by the node.
    async fn chain_id(&self) -> Result<u64, ChainError>;

    /// Read-only contract call, decoded with the function's output types.
    async fn read(
        &self,
        contract: Address,
        function: &Function,
        args: &[Token],
    ) -> Result<Vec<Token>, ChainError>;

    /// Simulate, then submit a transaction.
    ///
    /// # Errors
    ///
    /// `ChainError::Write` carrying the simulation revert data when the
    /// simulation fails.
    async fn write(
        &self,
        contract: Address,
        function: &Function,
        args: &[Token],
        value: Amount,
    ) -> Result<TxHash, ChainError>;

    /// Block until the transaction is included and return its receipt.
    async fn wait(&self, tx: TxHash) -> Result<Receipt, ChainError>;
}
