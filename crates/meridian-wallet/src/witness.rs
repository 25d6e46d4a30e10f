//! Witness composition.
//!
//! Attaches the sender's witness to a draft, merging it with any witnesses
//! the draft already carries for other authorized script hashes. The ledger
//! verifies witnesses positionally against the ascending order of the
//! script hashes they answer for, so ordering here is load-bearing.

use crate::error::WalletError;
use meridian_tx::{Transaction, Witness};
use meridian_types::UInt160;

/// Attach `witness` (signed by `spender`) to `tx` and return the finished
/// transaction.
///
/// The draft's Script attributes decide the shape: no hashes other than the
/// spender means the sender's witness stands alone; exactly one other hash
/// means the draft must already carry that hash's witness, and the two are
/// ordered by ascending script hash. Anything else is a state the engine
/// never constructs.
pub fn finish_witnesses(
    tx: &Transaction,
    spender: UInt160,
    witness: Witness,
) -> Result<Transaction, WalletError> {
    let mut others: Vec<UInt160> = tx
        .script_attributes()
        .into_iter()
        .filter(|hash| *hash != spender)
        .collect();
    others.sort();
    others.dedup();

    match others.as_slice() {
        [] => {
            if !tx.witnesses.is_empty() {
                return Err(WalletError::InvalidTransactionState(format!(
                    "expected no witnesses on a single-signer draft, found {}",
                    tx.witnesses.len()
                )));
            }
            Ok(tx.with_witnesses(vec![witness]))
        }
        [other] => {
            if tx.witnesses.len() != 1 {
                return Err(WalletError::InvalidTransactionState(format!(
                    "expected exactly one witness for co-signer {other}, found {}",
                    tx.witnesses.len()
                )));
            }
            let other_witness = tx.witnesses[0].clone();
            let witnesses = if spender < *other {
                vec![witness, other_witness]
            } else {
                vec![other_witness, witness]
            };
            Ok(tx.with_witnesses(witnesses))
        }
        _ => Err(WalletError::InvalidTransactionState(format!(
            "{} script authorizations besides the sender",
            others.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_tx::{Attribute, TxData};

    fn spender() -> UInt160 {
        UInt160([0x50; 20])
    }

    fn signer_witness() -> Witness {
        Witness {
            invocation: vec![0x01],
            verification: vec![0x02],
        }
    }

    fn contract_witness() -> Witness {
        Witness {
            invocation: vec![0x03],
            verification: vec![],
        }
    }

    fn draft(attributes: Vec<Attribute>, witnesses: Vec<Witness>) -> Transaction {
        Transaction::new(1, TxData::Contract, vec![], vec![], attributes).with_witnesses(witnesses)
    }

    #[test]
    fn lone_sender_gets_single_witness() {
        let tx = draft(vec![Attribute::script(spender())], vec![]);
        let signed = finish_witnesses(&tx, spender(), signer_witness()).unwrap();
        assert_eq!(signed.witnesses, vec![signer_witness()]);
    }

    #[test]
    fn no_script_attributes_also_single_witness() {
        let tx = draft(vec![], vec![]);
        let signed = finish_witnesses(&tx, spender(), signer_witness()).unwrap();
        assert_eq!(signed.witnesses.len(), 1);
    }

    #[test]
    fn co_signer_with_smaller_hash_comes_first() {
        let other = UInt160([0x10; 20]);
        let tx = draft(
            vec![Attribute::script(spender()), Attribute::script(other)],
            vec![contract_witness()],
        );
        let signed = finish_witnesses(&tx, spender(), signer_witness()).unwrap();
        assert_eq!(
            signed.witnesses,
            vec![contract_witness(), signer_witness()]
        );
    }

    #[test]
    fn co_signer_with_larger_hash_comes_second() {
        let other = UInt160([0xf0; 20]);
        let tx = draft(
            vec![Attribute::script(other), Attribute::script(spender())],
            vec![contract_witness()],
        );
        let signed = finish_witnesses(&tx, spender(), signer_witness()).unwrap();
        assert_eq!(
            signed.witnesses,
            vec![signer_witness(), contract_witness()]
        );
    }

    #[test]
    fn co_signer_without_witness_is_invalid() {
        let other = UInt160([0x10; 20]);
        let tx = draft(
            vec![Attribute::script(spender()), Attribute::script(other)],
            vec![],
        );
        let err = finish_witnesses(&tx, spender(), signer_witness()).unwrap_err();
        assert!(matches!(err, WalletError::InvalidTransactionState(_)));
    }

    #[test]
    fn two_co_signers_is_invalid() {
        let tx = draft(
            vec![
                Attribute::script(UInt160([0x10; 20])),
                Attribute::script(UInt160([0x20; 20])),
                Attribute::script(spender()),
            ],
            vec![contract_witness()],
        );
        let err = finish_witnesses(&tx, spender(), signer_witness()).unwrap_err();
        assert!(matches!(err, WalletError::InvalidTransactionState(_)));
    }

    #[test]
    fn stray_witness_on_single_signer_draft_is_invalid() {
        let tx = draft(vec![Attribute::script(spender())], vec![contract_witness()]);
        let err = finish_witnesses(&tx, spender(), signer_witness()).unwrap_err();
        assert!(matches!(err, WalletError::InvalidTransactionState(_)));
    }
}
