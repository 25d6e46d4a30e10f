//! Meridian core types.
//!
//! Value types shared by every crate in the workspace: network identifiers,
//! 160/256-bit hashes, base58check addresses, and fixed-point ledger amounts.

pub mod address;
pub mod constants;
pub mod fixed8;
pub mod hash;

pub use address::{Address, AddressError};
pub use constants::{AccountId, Network, CORE_ASSET, ISSUE_TRANSACTION_FEE, UTILITY_ASSET};
pub use fixed8::{Fixed8, Fixed8Error};
pub use hash::{HashError, UInt160, UInt256};
