//! Meridian node RPC client.
//!
//! Async JSON-RPC 2.0 client with typed methods for the read/write surface
//! the wallet engine consumes.

pub mod client;
pub mod error;
pub mod node;

pub use client::{RpcClient, RpcConfig};
pub use error::RpcError;
pub use node::{
    Claimable, ClaimReference, FeeSchedule, InvocationData, InvocationOutcome, NodeClient,
    RelayResult, TransactionReceipt, UnspentOutput,
};
