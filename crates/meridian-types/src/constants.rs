//! Network identifiers, account identifiers, and well-known asset ledgers.

use crate::address::Address;
use crate::fixed8::Fixed8;
use crate::hash::UInt256;
use serde::{Deserialize, Serialize};

/// Network type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Privnet,
}

impl Network {
    /// Default RPC port for nodes on this network.
    pub fn default_rpc_port(&self) -> u16 {
        match self {
            Network::Mainnet => 10332,
            Network::Testnet => 20332,
            Network::Privnet => 30332,
        }
    }
}

/// A spending authority on a specific network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId {
    pub network: Network,
    pub address: Address,
}

/// Asset id of the governing token (the core asset).
pub const CORE_ASSET: UInt256 = UInt256([
    0xc5, 0x6f, 0x33, 0xfc, 0x6e, 0xcf, 0xcd, 0x0c, 0x22, 0x5c, 0x4a, 0xb3, 0x56, 0xfe, 0xe5,
    0x93, 0x90, 0xaf, 0x85, 0x60, 0xbe, 0x0e, 0x93, 0x0f, 0xae, 0xbe, 0x74, 0xa6, 0xda, 0xff,
    0x7c, 0x9b,
]);

/// Asset id of the utility token, in which gas fees and claim rewards are
/// denominated.
pub const UTILITY_ASSET: UInt256 = UInt256([
    0x60, 0x2c, 0x79, 0x71, 0x8b, 0x16, 0xe4, 0x42, 0xde, 0x58, 0x77, 0x8e, 0x14, 0x8d, 0x0b,
    0x10, 0x84, 0xe3, 0xb2, 0xdf, 0xfd, 0x5d, 0xe6, 0xb7, 0xb1, 0x6c, 0xee, 0x79, 0x69, 0x28,
    0x2d, 0xe7,
]);

/// Fallback issuance fee charged for an issue transaction when the node's
/// fee schedule is unavailable. Nodes report the authoritative value via
/// `get_fee_schedule`.
pub const ISSUE_TRANSACTION_FEE: Fixed8 = Fixed8::from_whole(500);
