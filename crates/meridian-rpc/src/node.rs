//! Typed node RPC methods.
//!
//! One `NodeClient` speaks to one node on one network. Methods cover the
//! read/write surface the wallet engine needs: spendable outputs, claimable
//! rewards, chain height, dry-run execution, relay, receipts, invocation
//! data, and the network fee schedule.

use crate::client::{RpcClient, RpcConfig};
use crate::error::RpcError;
use meridian_types::{Address, Fixed8, Network, UInt160, UInt256};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

/// How often the receipt poll re-queries the node.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

// =============================================================================
// Response types
// =============================================================================

/// A spendable output owned by an address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnspentOutput {
    pub tx_hash: UInt256,
    pub index: u16,
    pub asset: UInt256,
    pub value: Fixed8,
    pub address: Address,
}

/// Reference to a claimable (already spent, reward-accruing) output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ClaimReference {
    pub tx_hash: UInt256,
    pub index: u16,
}

/// The claimable set for an address, with the total accrued reward.
#[derive(Debug, Clone, Deserialize)]
pub struct Claimable {
    pub claims: Vec<ClaimReference>,
    pub amount: Fixed8,
}

/// Result of executing a script, committed or dry-run.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "state")]
pub enum InvocationOutcome {
    #[serde(rename = "HALT")]
    Success {
        gas_consumed: Fixed8,
        gas_cost: Fixed8,
        #[serde(default)]
        stack: Vec<Value>,
    },
    #[serde(rename = "FAULT")]
    Fault {
        gas_consumed: Fixed8,
        gas_cost: Fixed8,
        #[serde(default)]
        message: String,
    },
}

impl InvocationOutcome {
    pub fn is_fault(&self) -> bool {
        matches!(self, InvocationOutcome::Fault { .. })
    }
}

/// Node acknowledgement of a relayed transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayResult {
    pub tx_hash: UInt256,
    /// Verification failure messages; non-empty means the relay was refused.
    #[serde(default)]
    pub failures: Vec<String>,
}

/// Proof that a transaction was included in a block.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionReceipt {
    pub block_index: u64,
    pub block_hash: UInt256,
    pub transaction_index: u32,
}

/// Decoded on-chain effects of a confirmed invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct InvocationData {
    pub result: InvocationOutcome,
    #[serde(default)]
    pub created_contracts: Vec<UInt160>,
    #[serde(default)]
    pub created_asset: Option<UInt256>,
}

/// Protocol fee schedule reported by the node.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FeeSchedule {
    pub issuance_fee: Fixed8,
}

// =============================================================================
// NodeClient
// =============================================================================

/// Typed RPC client for a single node.
pub struct NodeClient {
    client: RpcClient,
    network: Network,
}

impl NodeClient {
    pub fn new(network: Network, url: &str) -> Self {
        Self {
            client: RpcClient::new(url),
            network,
        }
    }

    pub fn with_config(network: Network, config: RpcConfig) -> Self {
        Self {
            client: RpcClient::with_config(config),
            network,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, RpcError> {
        let value = self.client.call(method, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Spendable outputs currently owned by `address`.
    pub async fn get_unspent_outputs(
        &self,
        address: &Address,
    ) -> Result<Vec<UnspentOutput>, RpcError> {
        self.call("getunspents", json!([address.to_string()])).await
    }

    /// Claimable set and accrued reward for `address`.
    pub async fn get_claimable(&self, address: &Address) -> Result<Claimable, RpcError> {
        self.call("getclaimable", json!([address.to_string()])).await
    }

    /// Current chain height.
    pub async fn get_block_count(&self) -> Result<u64, RpcError> {
        self.call("getblockcount", json!([])).await
    }

    /// Execute a serialized transaction's script without committing effects.
    pub async fn test_invoke(&self, raw_tx_hex: &str) -> Result<InvocationOutcome, RpcError> {
        self.call("invokerawtransaction", json!([raw_tx_hex])).await
    }

    /// Relay a fully signed transaction.
    pub async fn relay_transaction(&self, raw_tx_hex: &str) -> Result<RelayResult, RpcError> {
        let result: RelayResult = self
            .call("sendrawtransaction", json!([raw_tx_hex]))
            .await?;
        if !result.failures.is_empty() {
            return Err(RpcError::RelayRefused(result.failures.join(" ")));
        }
        Ok(result)
    }

    /// Poll for the receipt of `tx_hash` until `deadline` elapses.
    ///
    /// The node answers "not found" until the transaction is included in a
    /// block; that answer is re-polled, every other error propagates.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: &UInt256,
        deadline: Duration,
    ) -> Result<TransactionReceipt, RpcError> {
        let started = Instant::now();
        loop {
            match self
                .call::<TransactionReceipt>("getreceipt", json!([tx_hash.to_hex()]))
                .await
            {
                Ok(receipt) => return Ok(receipt),
                Err(RpcError::Rpc { code, .. }) if code == -100 => {
                    if started.elapsed() >= deadline {
                        return Err(RpcError::ReceiptTimeout);
                    }
                    log::debug!("receipt for {tx_hash} not found yet, polling");
                    tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Decoded effects of a confirmed invocation transaction.
    pub async fn get_invocation_data(
        &self,
        tx_hash: &UInt256,
    ) -> Result<InvocationData, RpcError> {
        self.call("getinvocationdata", json!([tx_hash.to_hex()]))
            .await
    }

    /// The node's protocol fee schedule.
    pub async fn get_fee_schedule(&self) -> Result<FeeSchedule, RpcError> {
        self.call("getfeeschedule", json!([])).await
    }
}
