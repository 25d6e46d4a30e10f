//! Spendable-pool snapshot.
//!
//! Fetches the chain height and the unspent view for an address in one shot,
//! feeds the height to the pending-spend tracker, and hands coin selection a
//! pool with every reserved outpoint removed. The snapshot records whether
//! filtering removed anything, so a later shortfall can be reported as
//! funds-in-use rather than a plain insufficiency.

use crate::error::WalletError;
use crate::pending::PendingSpends;
use crate::provider::LedgerProvider;
use crate::select::{select_coverage, Coverage, Transfer};
use meridian_rpc::UnspentOutput;
use meridian_tx::Input;
use meridian_types::{Address, Fixed8, UTILITY_ASSET};

/// A point-in-time view of what an address can spend.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub block_count: u64,
    pub spendable: Vec<UnspentOutput>,
    /// Whether any output was removed as reserved.
    pub was_filtered: bool,
    /// Reservations outstanding after the height observation.
    pub reserved_count: usize,
}

/// Fetch the spendable pool for `address`, filtered through `pending`.
pub async fn fetch_spendable<P: LedgerProvider>(
    provider: &P,
    pending: &PendingSpends,
    address: &Address,
) -> Result<Snapshot, WalletError> {
    let block_count = provider.get_block_count().await?;
    pending.observe_block_count(block_count);

    let unspents = provider.get_unspent_outputs(address).await?;
    let before = unspents.len();
    let spendable: Vec<UnspentOutput> = unspents
        .into_iter()
        .filter(|u| {
            !pending.is_reserved(&Input {
                tx_hash: u.tx_hash,
                index: u.index,
            })
        })
        .collect();
    let was_filtered = spendable.len() != before;

    Ok(Snapshot {
        block_count,
        spendable,
        was_filtered,
        reserved_count: pending.reserved_count(),
    })
}

/// Take a fresh snapshot and select coverage for `transfers` plus a `fee`
/// in the utility asset. A positive fee is folded in as one more transfer
/// with no destination, so it draws inputs and change like any other.
pub async fn fund_transfers<P: LedgerProvider>(
    provider: &P,
    pending: &PendingSpends,
    spender: &Address,
    transfers: &[Transfer],
    fee: Fixed8,
) -> Result<Coverage, WalletError> {
    let mut all: Vec<Transfer> = transfers.to_vec();
    if fee > Fixed8::ZERO {
        all.push(Transfer::fee(UTILITY_ASSET, fee));
    }
    if all.is_empty() {
        return Ok(Coverage::default());
    }

    let snapshot = fetch_spendable(provider, pending, spender).await?;
    select_coverage(
        &all,
        *spender,
        &snapshot.spendable,
        snapshot.was_filtered,
        snapshot.reserved_count,
    )
}
