//! Ledger access boundary.
//!
//! Everything the engine learns about chain state comes through this trait.
//! `NodeClient` is the production implementation; tests substitute in-memory
//! ledgers.

use meridian_rpc::{
    Claimable, FeeSchedule, InvocationData, InvocationOutcome, NodeClient, RelayResult,
    TransactionReceipt, UnspentOutput,
};
use meridian_rpc::RpcError;
use meridian_types::{Address, Network, UInt256};
use std::future::Future;
use std::time::Duration;

/// Read/write view of the ledger the engine runs against.
pub trait LedgerProvider: Send + Sync {
    /// The network this provider serves.
    fn network(&self) -> Network;

    fn get_unspent_outputs(
        &self,
        address: &Address,
    ) -> impl Future<Output = Result<Vec<UnspentOutput>, RpcError>> + Send;

    fn get_claimable(
        &self,
        address: &Address,
    ) -> impl Future<Output = Result<Claimable, RpcError>> + Send;

    fn get_block_count(&self) -> impl Future<Output = Result<u64, RpcError>> + Send;

    /// Execute a transaction's script without committing effects.
    fn test_invoke(
        &self,
        raw_tx_hex: &str,
    ) -> impl Future<Output = Result<InvocationOutcome, RpcError>> + Send;

    /// Relay a fully signed transaction. Refusal is an error.
    fn relay_transaction(
        &self,
        raw_tx_hex: &str,
    ) -> impl Future<Output = Result<RelayResult, RpcError>> + Send;

    /// Wait for inclusion of `tx_hash`, up to `deadline`.
    fn get_transaction_receipt(
        &self,
        tx_hash: &UInt256,
        deadline: Duration,
    ) -> impl Future<Output = Result<TransactionReceipt, RpcError>> + Send;

    fn get_invocation_data(
        &self,
        tx_hash: &UInt256,
    ) -> impl Future<Output = Result<InvocationData, RpcError>> + Send;

    fn get_fee_schedule(&self) -> impl Future<Output = Result<FeeSchedule, RpcError>> + Send;
}

impl LedgerProvider for NodeClient {
    fn network(&self) -> Network {
        NodeClient::network(self)
    }

    async fn get_unspent_outputs(&self, address: &Address) -> Result<Vec<UnspentOutput>, RpcError> {
        NodeClient::get_unspent_outputs(self, address).await
    }

    async fn get_claimable(&self, address: &Address) -> Result<Claimable, RpcError> {
        NodeClient::get_claimable(self, address).await
    }

    async fn get_block_count(&self) -> Result<u64, RpcError> {
        NodeClient::get_block_count(self).await
    }

    async fn test_invoke(&self, raw_tx_hex: &str) -> Result<InvocationOutcome, RpcError> {
        NodeClient::test_invoke(self, raw_tx_hex).await
    }

    async fn relay_transaction(&self, raw_tx_hex: &str) -> Result<RelayResult, RpcError> {
        NodeClient::relay_transaction(self, raw_tx_hex).await
    }

    async fn get_transaction_receipt(
        &self,
        tx_hash: &UInt256,
        deadline: Duration,
    ) -> Result<TransactionReceipt, RpcError> {
        NodeClient::get_transaction_receipt(self, tx_hash, deadline).await
    }

    async fn get_invocation_data(&self, tx_hash: &UInt256) -> Result<InvocationData, RpcError> {
        NodeClient::get_invocation_data(self, tx_hash).await
    }

    async fn get_fee_schedule(&self) -> Result<FeeSchedule, RpcError> {
        NodeClient::get_fee_schedule(self).await
    }
}
