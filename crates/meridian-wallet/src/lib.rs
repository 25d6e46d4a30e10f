//! Client-side wallet transaction engine.
//!
//! Builds, prices, signs, relays, and tracks ledger transactions against a
//! remote node. Key custody sits behind [`KeyStore`] and ledger access
//! behind [`LedgerProvider`], so the engine itself holds no secrets and no
//! network code.

pub mod assemble;
pub mod engine;
pub mod error;
pub mod invoke;
pub mod keystore;
pub mod pending;
pub mod provider;
pub mod result;
pub mod select;
pub mod snapshot;
pub mod witness;

pub use assemble::{AssetKind, AssetRegister, ContractRegister, ENGINE_TAG};
pub use engine::{IssueRequest, TransactionEngine, TransactionOptions, TransferRequest};
pub use error::WalletError;
pub use invoke::DRY_RUN_GAS;
pub use keystore::{KeyStore, KeyStoreError};
pub use pending::PendingSpends;
pub use provider::LedgerProvider;
pub use result::{InvokeReceipt, InvokeResult, TransactionResult, DEFAULT_CONFIRM_TIMEOUT};
pub use select::{select_coverage, Coverage, Transfer};
pub use snapshot::{fetch_spendable, Snapshot};
pub use witness::finish_witnesses;
