//! Coin selection.
//!
//! Greedy largest-first selection over the spendable pool. Transfers are
//! grouped per asset and satisfied in order; over-selection for one transfer
//! becomes credit for the next transfer of the same asset, and whatever
//! credit is left at the end of a group comes back to the spender as a
//! change output. Selection is pure: it sees a snapshot of candidates and
//! never touches the network.

use crate::error::WalletError;
use meridian_rpc::UnspentOutput;
use meridian_tx::{Input, Output};
use meridian_types::{Address, Fixed8, UInt256};

/// One requested movement of value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// Destination. `None` means the value is consumed (a fee) rather than
    /// paid out, so no direct output is emitted.
    pub to: Option<Address>,
    pub asset: UInt256,
    pub amount: Fixed8,
}

impl Transfer {
    pub fn new(to: Address, asset: UInt256, amount: Fixed8) -> Self {
        Self {
            to: Some(to),
            asset,
            amount,
        }
    }

    /// A transfer with no destination: the amount is burned as a fee.
    pub fn fee(asset: UInt256, amount: Fixed8) -> Self {
        Self {
            to: None,
            asset,
            amount,
        }
    }
}

/// The inputs chosen to fund a set of transfers, with the outputs they pay.
#[derive(Debug, Clone, Default)]
pub struct Coverage {
    pub inputs: Vec<UnspentOutput>,
    pub outputs: Vec<Output>,
}

impl Coverage {
    pub fn input_refs(&self) -> Vec<Input> {
        self.inputs
            .iter()
            .map(|u| Input {
                tx_hash: u.tx_hash,
                index: u.index,
            })
            .collect()
    }
}

/// Select inputs from `candidates` covering every transfer, and build the
/// direct and change outputs.
///
/// `was_filtered` and `reserved_count` describe what the snapshot removed as
/// reserved by unconfirmed transactions; they decide which shortfall error a
/// caller sees.
pub fn select_coverage(
    transfers: &[Transfer],
    spender: Address,
    candidates: &[UnspentOutput],
    was_filtered: bool,
    reserved_count: usize,
) -> Result<Coverage, WalletError> {
    let mut coverage = Coverage::default();

    for (asset, group) in group_by_asset(transfers) {
        let mut pool: Vec<&UnspentOutput> = candidates.iter().filter(|u| u.asset == asset).collect();
        // Largest first, so big transfers take few inputs.
        pool.sort_by(|a, b| b.value.cmp(&a.value));

        let mut credit = Fixed8::ZERO;
        for transfer in &group {
            if let Some(to) = transfer.to {
                coverage.outputs.push(Output {
                    asset,
                    value: transfer.amount,
                    address: to.script_hash(),
                });
            }

            // Previous over-selection in this group pays first.
            if transfer.amount <= credit {
                credit = credit.saturating_sub(transfer.amount);
                continue;
            }
            let needed = transfer.amount.saturating_sub(credit);

            let available: Fixed8 = pool.iter().map(|u| u.value).sum();
            if available < needed {
                return Err(shortfall(available, needed, was_filtered, reserved_count));
            }

            let taken = take_covering(&mut pool, needed);
            let selected: Fixed8 = taken.iter().map(|u| u.value).sum();
            credit = selected.saturating_sub(needed);
            coverage.inputs.extend(taken.into_iter().cloned());
        }

        if credit > Fixed8::ZERO {
            coverage.outputs.push(Output {
                asset,
                value: credit,
                address: spender.script_hash(),
            });
        }
    }

    Ok(coverage)
}

/// Group transfers by asset, preserving first-appearance order of both the
/// assets and the transfers within each asset.
fn group_by_asset(transfers: &[Transfer]) -> Vec<(UInt256, Vec<&Transfer>)> {
    let mut groups: Vec<(UInt256, Vec<&Transfer>)> = Vec::new();
    for transfer in transfers {
        match groups.iter_mut().find(|(asset, _)| *asset == transfer.asset) {
            Some((_, group)) => group.push(transfer),
            None => groups.push((transfer.asset, vec![transfer])),
        }
    }
    groups
}

/// Remove and return the smallest descending-sorted prefix of `pool` whose
/// sum reaches `needed`. The caller has checked the pool covers it.
fn take_covering<'a>(pool: &mut Vec<&'a UnspentOutput>, needed: Fixed8) -> Vec<&'a UnspentOutput> {
    let mut remaining = needed;
    let mut k = 0;
    while k < pool.len() && pool[k].value <= remaining {
        remaining = remaining.saturating_sub(pool[k].value);
        if remaining == Fixed8::ZERO {
            break;
        }
        k += 1;
    }
    let count = (k + 1).min(pool.len());
    pool.drain(..count).collect()
}

fn shortfall(
    available: Fixed8,
    required: Fixed8,
    was_filtered: bool,
    reserved_count: usize,
) -> WalletError {
    if was_filtered {
        WalletError::FundsInUse {
            available,
            required,
            pending: reserved_count,
        }
    } else {
        WalletError::InsufficientFunds {
            available,
            required,
        }
    }
}
