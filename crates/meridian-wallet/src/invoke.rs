//! Invocation pricing lifecycle.
//!
//! An invocation is funded twice. The first coverage pass assumes zero gas
//! and produces a draft that is dry-run on a node with a placeholder gas
//! allowance; the consumed gas, rounded up to whole units, then prices a
//! second pass that funds the real transaction. The draft and the final
//! transaction are built independently so no half-priced intermediate can
//! escape.

use crate::assemble::nonce_attribute;
use crate::error::WalletError;
use crate::pending::PendingSpends;
use crate::provider::LedgerProvider;
use crate::select::Transfer;
use crate::snapshot::fund_transfers;
use meridian_rpc::InvocationOutcome;
use meridian_tx::{Attribute, Transaction, TxData, Witness};
use meridian_types::{Address, Fixed8};

/// Gas allowance granted to dry runs. Generous enough that pricing is never
/// cut short; the real allowance comes from the measurement.
pub const DRY_RUN_GAS: Fixed8 = Fixed8::from_whole(10_000);

const INVOCATION_VERSION: u8 = 1;

/// Build, dry-run, price, and rebuild an invocation transaction. The result
/// is unsigned.
pub(crate) async fn build_priced_invocation<P: LedgerProvider>(
    provider: &P,
    pending: &PendingSpends,
    spender: &Address,
    script: Vec<u8>,
    transfers: &[Transfer],
    mut attributes: Vec<Attribute>,
    placeholder_witnesses: Vec<Witness>,
    network_fee: Fixed8,
) -> Result<Transaction, WalletError> {
    // The nonce is fixed before the dry run so both passes describe the
    // same logical transaction.
    attributes.push(nonce_attribute());

    let draft_coverage =
        fund_transfers(provider, pending, spender, transfers, network_fee).await?;
    let draft = Transaction::new(
        INVOCATION_VERSION,
        TxData::Invocation {
            script: script.clone(),
            gas: DRY_RUN_GAS,
        },
        draft_coverage.input_refs(),
        draft_coverage.outputs.clone(),
        attributes.clone(),
    )
    .with_witnesses(placeholder_witnesses.clone());

    let outcome = provider.test_invoke(&draft.wire_hex()).await?;
    let gas = match outcome {
        InvocationOutcome::Fault { message, .. } => {
            return Err(WalletError::InvocationFault(message));
        }
        InvocationOutcome::Success { gas_consumed, .. } => gas_consumed.ceil(),
    };
    log::debug!("invocation priced at {gas} gas");

    let coverage = if gas > Fixed8::ZERO {
        let total = network_fee.checked_add(gas)?;
        fund_transfers(provider, pending, spender, transfers, total).await?
    } else {
        draft_coverage
    };

    Ok(Transaction::new(
        INVOCATION_VERSION,
        TxData::Invocation { script, gas },
        coverage.input_refs(),
        coverage.outputs,
        attributes,
    )
    .with_witnesses(placeholder_witnesses))
}
