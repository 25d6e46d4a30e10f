//! Wallet engine error types.

use crate::keystore::KeyStoreError;
use meridian_rpc::RpcError;
use meridian_types::Fixed8;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("insufficient funds: {available} available, {required} required")]
    InsufficientFunds {
        available: Fixed8,
        required: Fixed8,
    },

    #[error(
        "insufficient funds: {available} available, {required} required; \
         {pending} output(s) are reserved by unconfirmed transactions, \
         retry after the next block"
    )]
    FundsInUse {
        available: Fixed8,
        required: Fixed8,
        pending: usize,
    },

    #[error("nothing to transfer")]
    NothingToTransfer,

    #[error("nothing to claim")]
    NothingToClaim,

    #[error("nothing to issue")]
    NothingToIssue,

    #[error("invocation faulted: {0}")]
    InvocationFault(String),

    #[error("invalid transaction state: {0}")]
    InvalidTransactionState(String),

    #[error("transaction rejected by the network: {0}")]
    RelayRejected(String),

    #[error("transaction was not confirmed within the deadline")]
    ConfirmationTimeout,

    #[error("no account selected and none was given")]
    NoAccount,

    #[error("signing failed: {0}")]
    Signing(#[from] KeyStoreError),

    #[error("amount arithmetic failed: {0}")]
    Amount(#[from] meridian_types::Fixed8Error),

    #[error("RPC error: {0}")]
    Rpc(RpcError),
}

impl From<RpcError> for WalletError {
    fn from(e: RpcError) -> Self {
        match e {
            RpcError::RelayRefused(msg) => WalletError::RelayRejected(msg),
            RpcError::ReceiptTimeout => WalletError::ConfirmationTimeout,
            other => WalletError::Rpc(other),
        }
    }
}
