//! Relay results and confirmation tracking.

use crate::error::WalletError;
use crate::provider::LedgerProvider;
use meridian_rpc::{InvocationOutcome, TransactionReceipt};
use meridian_tx::Transaction;
use meridian_types::{UInt160, UInt256};
use std::sync::Arc;
use std::time::Duration;

/// How long `confirmed()` waits when the caller gives no deadline.
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(120);

/// A relayed transaction, with a handle for awaiting its inclusion.
pub struct TransactionResult<P> {
    pub transaction: Transaction,
    pub tx_hash: UInt256,
    provider: Arc<P>,
}

impl<P> std::fmt::Debug for TransactionResult<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionResult")
            .field("transaction", &self.transaction)
            .field("tx_hash", &self.tx_hash)
            .finish_non_exhaustive()
    }
}

impl<P: LedgerProvider> TransactionResult<P> {
    pub(crate) fn new(transaction: Transaction, tx_hash: UInt256, provider: Arc<P>) -> Self {
        Self {
            transaction,
            tx_hash,
            provider,
        }
    }

    /// Wait until the transaction is included in a block, up to `timeout`
    /// (default two minutes).
    pub async fn confirmed(
        &self,
        timeout: Option<Duration>,
    ) -> Result<TransactionReceipt, WalletError> {
        let deadline = timeout.unwrap_or(DEFAULT_CONFIRM_TIMEOUT);
        Ok(self
            .provider
            .get_transaction_receipt(&self.tx_hash, deadline)
            .await?)
    }
}

/// Inclusion proof plus the decoded on-chain effects of an invocation.
#[derive(Debug, Clone)]
pub struct InvokeReceipt {
    pub receipt: TransactionReceipt,
    pub result: InvocationOutcome,
    pub created_contracts: Vec<UInt160>,
    pub created_asset: Option<UInt256>,
}

/// A relayed invocation transaction.
pub struct InvokeResult<P> {
    inner: TransactionResult<P>,
}

impl<P> std::fmt::Debug for InvokeResult<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvokeResult")
            .field("inner", &self.inner)
            .finish()
    }
}

impl<P: LedgerProvider> InvokeResult<P> {
    pub(crate) fn new(inner: TransactionResult<P>) -> Self {
        Self { inner }
    }

    pub fn transaction(&self) -> &Transaction {
        &self.inner.transaction
    }

    pub fn tx_hash(&self) -> UInt256 {
        self.inner.tx_hash
    }

    /// Wait for inclusion and fetch what the committed execution did.
    pub async fn confirmed(
        &self,
        timeout: Option<Duration>,
    ) -> Result<InvokeReceipt, WalletError> {
        let receipt = self.inner.confirmed(timeout).await?;
        let data = self
            .inner
            .provider
            .get_invocation_data(&self.inner.tx_hash)
            .await?;
        Ok(InvokeReceipt {
            receipt,
            result: data.result,
            created_contracts: data.created_contracts,
            created_asset: data.created_asset,
        })
    }
}
