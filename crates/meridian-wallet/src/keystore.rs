//! Key custody boundary.
//!
//! The engine never sees private key material. It hands a keystore the hex of
//! an unsigned transaction and receives a complete witness back; anything
//! from an in-memory softkey to a hardware signer can sit behind the trait.

use meridian_tx::Witness;
use meridian_types::AccountId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("unknown account {0}")]
    UnknownAccount(String),

    #[error("account {0} is locked")]
    Locked(String),

    #[error("signer failed: {0}")]
    Signer(String),
}

/// Signs unsigned transactions on behalf of managed accounts.
pub trait KeyStore: Send + Sync {
    /// The account used when an operation names no sender.
    fn current_account(&self) -> Option<AccountId>;

    /// All accounts this keystore can sign for.
    fn accounts(&self) -> Vec<AccountId>;

    /// Produce a witness over the serialized unsigned transaction.
    fn sign(
        &self,
        account: &AccountId,
        message_hex: &str,
    ) -> impl std::future::Future<Output = Result<Witness, KeyStoreError>> + Send;
}
