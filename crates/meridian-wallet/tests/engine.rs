//! End-to-end engine tests over in-memory collaborators.

use meridian_rpc::{
    Claimable, ClaimReference, FeeSchedule, InvocationData, InvocationOutcome, RelayResult,
    TransactionReceipt, UnspentOutput,
};
use meridian_rpc::RpcError;
use meridian_tx::{ContractParam, TxData, Witness};
use meridian_types::{
    AccountId, Address, Fixed8, Network, UInt160, UInt256, UTILITY_ASSET,
};
use meridian_wallet::{
    IssueRequest, KeyStore, KeyStoreError, LedgerProvider, TransactionEngine, TransactionOptions,
    TransferRequest, WalletError,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const ASSET: UInt256 = UInt256([0xaa; 32]);

fn addr(n: u8) -> Address {
    Address::from_script_hash(UInt160([n; 20]))
}

fn account(n: u8) -> AccountId {
    AccountId {
        network: Network::Privnet,
        address: addr(n),
    }
}

fn utxo(n: u8, index: u16, asset: UInt256, whole: i64) -> UnspentOutput {
    UnspentOutput {
        tx_hash: UInt256([n; 32]),
        index,
        asset,
        value: Fixed8::from_whole(whole),
        address: addr(1),
    }
}

// =============================================================================
// Mock collaborators
// =============================================================================

struct MockKeyStore {
    account: AccountId,
    signed: Mutex<Vec<String>>,
}

impl MockKeyStore {
    fn new(account: AccountId) -> Self {
        Self {
            account,
            signed: Mutex::new(Vec::new()),
        }
    }

    fn signed_count(&self) -> usize {
        self.signed.lock().unwrap().len()
    }
}

impl KeyStore for MockKeyStore {
    fn current_account(&self) -> Option<AccountId> {
        Some(self.account)
    }

    fn accounts(&self) -> Vec<AccountId> {
        vec![self.account]
    }

    async fn sign(
        &self,
        _account: &AccountId,
        message_hex: &str,
    ) -> Result<Witness, KeyStoreError> {
        self.signed.lock().unwrap().push(message_hex.to_string());
        Ok(Witness {
            invocation: vec![0xab],
            verification: vec![0xcd],
        })
    }
}

struct MockLedger {
    block_count: Mutex<u64>,
    unspents: Mutex<Vec<UnspentOutput>>,
    claimable: Claimable,
    outcome: Mutex<InvocationOutcome>,
    relayed: Mutex<Vec<String>>,
    dry_runs: Mutex<Vec<String>>,
    receipt: Option<TransactionReceipt>,
    refuse_relay: bool,
}

impl MockLedger {
    fn new(unspents: Vec<UnspentOutput>) -> Self {
        Self {
            block_count: Mutex::new(100),
            unspents: Mutex::new(unspents),
            claimable: Claimable {
                claims: vec![],
                amount: Fixed8::ZERO,
            },
            outcome: Mutex::new(InvocationOutcome::Success {
                gas_consumed: Fixed8::ZERO,
                gas_cost: Fixed8::ZERO,
                stack: vec![],
            }),
            relayed: Mutex::new(Vec::new()),
            dry_runs: Mutex::new(Vec::new()),
            receipt: None,
            refuse_relay: false,
        }
    }

    fn relayed_count(&self) -> usize {
        self.relayed.lock().unwrap().len()
    }

    fn set_block_count(&self, count: u64) {
        *self.block_count.lock().unwrap() = count;
    }

    fn set_outcome(&self, outcome: InvocationOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }
}

impl LedgerProvider for MockLedger {
    fn network(&self) -> Network {
        Network::Privnet
    }

    async fn get_unspent_outputs(&self, _address: &Address) -> Result<Vec<UnspentOutput>, RpcError> {
        Ok(self.unspents.lock().unwrap().clone())
    }

    async fn get_claimable(&self, _address: &Address) -> Result<Claimable, RpcError> {
        Ok(self.claimable.clone())
    }

    async fn get_block_count(&self) -> Result<u64, RpcError> {
        Ok(*self.block_count.lock().unwrap())
    }

    async fn test_invoke(&self, raw_tx_hex: &str) -> Result<InvocationOutcome, RpcError> {
        self.dry_runs.lock().unwrap().push(raw_tx_hex.to_string());
        Ok(self.outcome.lock().unwrap().clone())
    }

    async fn relay_transaction(&self, raw_tx_hex: &str) -> Result<RelayResult, RpcError> {
        if self.refuse_relay {
            return Err(RpcError::RelayRefused("verification failed".into()));
        }
        self.relayed.lock().unwrap().push(raw_tx_hex.to_string());
        Ok(RelayResult {
            tx_hash: UInt256([0xee; 32]),
            failures: vec![],
        })
    }

    async fn get_transaction_receipt(
        &self,
        _tx_hash: &UInt256,
        _deadline: Duration,
    ) -> Result<TransactionReceipt, RpcError> {
        self.receipt.clone().ok_or(RpcError::ReceiptTimeout)
    }

    async fn get_invocation_data(&self, _tx_hash: &UInt256) -> Result<InvocationData, RpcError> {
        Ok(InvocationData {
            result: self.outcome.lock().unwrap().clone(),
            created_contracts: vec![],
            created_asset: None,
        })
    }

    async fn get_fee_schedule(&self) -> Result<FeeSchedule, RpcError> {
        Ok(FeeSchedule {
            issuance_fee: Fixed8::from_whole(500),
        })
    }
}

fn engine(
    ledger: MockLedger,
) -> (
    TransactionEngine<MockKeyStore, MockLedger>,
    Arc<MockKeyStore>,
    Arc<MockLedger>,
) {
    let keystore = Arc::new(MockKeyStore::new(account(1)));
    let provider = Arc::new(ledger);
    (
        TransactionEngine::new(Arc::clone(&keystore), Arc::clone(&provider)),
        keystore,
        provider,
    )
}

fn one_transfer(whole: i64) -> Vec<TransferRequest> {
    vec![TransferRequest {
        to: addr(2),
        asset: ASSET,
        amount: Fixed8::from_whole(whole),
        memo: None,
    }]
}

// =============================================================================
// Transfers
// =============================================================================

#[tokio::test]
async fn transfer_signs_relays_and_reserves() {
    let (engine, keystore, ledger) = engine(MockLedger::new(vec![utxo(1, 0, ASSET, 10)]));

    let result = engine
        .transfer(one_transfer(4), TransactionOptions::default())
        .await
        .unwrap();

    assert_eq!(keystore.signed_count(), 1);
    assert_eq!(ledger.relayed_count(), 1);
    assert_eq!(engine.reserved_count(), 1);
    assert_eq!(result.transaction.witnesses.len(), 1);
    assert_eq!(result.tx_hash, UInt256([0xee; 32]));
    // Direct output plus change.
    assert_eq!(result.transaction.outputs.len(), 2);
}

#[tokio::test]
async fn transfer_shortfall_signs_and_relays_nothing() {
    let (engine, keystore, ledger) = engine(MockLedger::new(vec![utxo(1, 0, ASSET, 2)]));

    let err = engine
        .transfer(one_transfer(5), TransactionOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, WalletError::InsufficientFunds { .. }));
    assert_eq!(keystore.signed_count(), 0);
    assert_eq!(ledger.relayed_count(), 0);
    assert_eq!(engine.reserved_count(), 0);
}

#[tokio::test]
async fn reserved_outputs_are_not_offered_again() {
    let (engine, _, ledger) = engine(MockLedger::new(vec![utxo(1, 0, ASSET, 10)]));

    engine
        .transfer(one_transfer(4), TransactionOptions::default())
        .await
        .unwrap();

    // Same height, same unspent view: the only output is now reserved.
    let err = engine
        .transfer(one_transfer(4), TransactionOptions::default())
        .await
        .unwrap_err();
    match err {
        WalletError::FundsInUse { pending, .. } => assert_eq!(pending, 1),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(ledger.relayed_count(), 1);
}

#[tokio::test]
async fn height_advance_releases_reservations() {
    let (engine, _, ledger) = engine(MockLedger::new(vec![utxo(1, 0, ASSET, 10)]));

    engine
        .transfer(one_transfer(4), TransactionOptions::default())
        .await
        .unwrap();
    assert_eq!(engine.reserved_count(), 1);

    ledger.set_block_count(101);
    engine
        .transfer(one_transfer(4), TransactionOptions::default())
        .await
        .unwrap();
    assert_eq!(ledger.relayed_count(), 2);
}

#[tokio::test]
async fn memo_becomes_description_attribute() {
    let (engine, _, _) = engine(MockLedger::new(vec![utxo(1, 0, ASSET, 10)]));

    let result = engine
        .transfer(
            vec![TransferRequest {
                to: addr(2),
                asset: ASSET,
                amount: Fixed8::from_whole(1),
                memo: Some("rent".into()),
            }],
            TransactionOptions::default(),
        )
        .await
        .unwrap();

    assert!(result
        .transaction
        .attributes
        .iter()
        .any(|a| a.data == b"rent"));
}

#[tokio::test]
async fn relay_refusal_reserves_nothing() {
    let mut ledger = MockLedger::new(vec![utxo(1, 0, ASSET, 10)]);
    ledger.refuse_relay = true;
    let (engine, keystore, _) = engine(ledger);

    let err = engine
        .transfer(one_transfer(4), TransactionOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, WalletError::RelayRejected(_)));
    // Signed, but the refused transaction must not pin its inputs.
    assert_eq!(keystore.signed_count(), 1);
    assert_eq!(engine.reserved_count(), 0);
}

#[tokio::test]
async fn wrong_network_sender_is_rejected() {
    let (engine, _, _) = engine(MockLedger::new(vec![utxo(1, 0, ASSET, 10)]));

    let err = engine
        .transfer(
            one_transfer(1),
            TransactionOptions {
                from: Some(AccountId {
                    network: Network::Mainnet,
                    address: addr(1),
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WalletError::Rpc(RpcError::UnknownNetwork(Network::Mainnet))
    ));
}

// =============================================================================
// Claims and issuance
// =============================================================================

#[tokio::test]
async fn claim_emits_reward_output() {
    let mut ledger = MockLedger::new(vec![]);
    ledger.claimable = Claimable {
        claims: vec![ClaimReference {
            tx_hash: UInt256([5u8; 32]),
            index: 0,
        }],
        amount: Fixed8::from_whole(3),
    };
    let (engine, _, _) = engine(ledger);

    let result = engine.claim(TransactionOptions::default()).await.unwrap();
    let tx = &result.transaction;
    assert_eq!(tx.claims().len(), 1);
    assert!(tx.inputs.is_empty());
    assert_eq!(tx.outputs.len(), 1);
    assert_eq!(tx.outputs[0].asset, UTILITY_ASSET);
    assert_eq!(tx.outputs[0].value, Fixed8::from_whole(3));
    assert_eq!(tx.outputs[0].address, addr(1).script_hash());
}

#[tokio::test]
async fn claim_with_empty_set_aborts() {
    let (engine, _, ledger) = engine(MockLedger::new(vec![]));
    let err = engine.claim(TransactionOptions::default()).await.unwrap_err();
    assert!(matches!(err, WalletError::NothingToClaim));
    assert_eq!(ledger.relayed_count(), 0);
}

#[tokio::test]
async fn issue_pays_issuance_fee_and_emits_issue_outputs() {
    let (engine, _, _) = engine(MockLedger::new(vec![utxo(1, 0, UTILITY_ASSET, 600)]));

    let result = engine
        .issue(
            vec![IssueRequest {
                to: addr(3),
                asset: UInt256([0x77; 32]),
                amount: Fixed8::from_whole(1000),
            }],
            TransactionOptions::default(),
        )
        .await
        .unwrap();

    let tx = &result.transaction;
    assert_eq!(tx.kind(), meridian_tx::TxKind::Issue);
    assert_eq!(tx.inputs.len(), 1);
    // Change for the 500 issuance fee, then the issued units.
    assert_eq!(tx.outputs.len(), 2);
    assert_eq!(tx.outputs[0].asset, UTILITY_ASSET);
    assert_eq!(tx.outputs[0].value, Fixed8::from_whole(100));
    assert_eq!(tx.outputs[1].asset, UInt256([0x77; 32]));
    assert_eq!(tx.outputs[1].value, Fixed8::from_whole(1000));
}

#[tokio::test]
async fn issue_nothing_aborts() {
    let (engine, _, _) = engine(MockLedger::new(vec![]));
    let err = engine
        .issue(vec![], TransactionOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::NothingToIssue));
}

// =============================================================================
// Invocations
// =============================================================================

#[tokio::test]
async fn invoke_prices_gas_from_dry_run() {
    let ledger = MockLedger::new(vec![utxo(1, 0, UTILITY_ASSET, 10)]);
    ledger.set_outcome(InvocationOutcome::Success {
        gas_consumed: "3.21".parse().unwrap(),
        gas_cost: "3.21".parse().unwrap(),
        stack: vec![],
    });
    let (engine, _, ledger) = engine(ledger);

    let result = engine
        .invoke(
            UInt160([0x42; 20]),
            "mint",
            vec![ContractParam::Int(7)],
            vec![("value".into(), ContractParam::Int(7))],
            false,
            TransactionOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(ledger.dry_runs.lock().unwrap().len(), 1);
    assert_eq!(ledger.relayed_count(), 1);
    match &result.transaction().data {
        TxData::Invocation { gas, .. } => assert_eq!(*gas, Fixed8::from_whole(4)),
        other => panic!("unexpected payload: {other:?}"),
    }
    // 3.21 rounded up to 4 whole units draws the 10-unit output with change.
    assert_eq!(result.transaction().inputs.len(), 1);
    assert_eq!(result.transaction().outputs.len(), 1);
    assert_eq!(
        result.transaction().outputs[0].value,
        Fixed8::from_whole(6)
    );
}

#[tokio::test]
async fn invoke_fault_aborts_before_signing() {
    let ledger = MockLedger::new(vec![utxo(1, 0, UTILITY_ASSET, 10)]);
    ledger.set_outcome(InvocationOutcome::Fault {
        gas_consumed: Fixed8::ZERO,
        gas_cost: Fixed8::ZERO,
        message: "invalid argument".into(),
    });
    let (engine, keystore, ledger) = engine(ledger);

    let err = engine
        .invoke(
            UInt160([0x42; 20]),
            "mint",
            vec![],
            vec![],
            false,
            TransactionOptions::default(),
        )
        .await
        .unwrap_err();

    match err {
        WalletError::InvocationFault(message) => assert_eq!(message, "invalid argument"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(keystore.signed_count(), 0);
    assert_eq!(ledger.relayed_count(), 0);
    assert_eq!(engine.reserved_count(), 0);
}

#[tokio::test]
async fn free_invocation_gets_self_authorization() {
    // Zero gas consumed, zero fee: no inputs fund the transaction, so the
    // sender is named explicitly and still signs.
    let (engine, keystore, _) = engine(MockLedger::new(vec![]));

    let result = engine
        .invoke(
            UInt160([0x42; 20]),
            "ping",
            vec![],
            vec![],
            false,
            TransactionOptions::default(),
        )
        .await
        .unwrap();

    let tx = result.transaction();
    assert!(tx.inputs.is_empty());
    assert_eq!(tx.script_attributes(), vec![addr(1).script_hash()]);
    assert_eq!(tx.witnesses.len(), 1);
    assert_eq!(keystore.signed_count(), 1);
}

#[tokio::test]
async fn call_relays_and_signs_nothing() {
    let (engine, keystore, ledger) = engine(MockLedger::new(vec![]));

    let outcome = engine
        .call(UInt160([0x42; 20]), "balance_of", vec![])
        .await
        .unwrap();

    assert!(!outcome.is_fault());
    assert_eq!(ledger.dry_runs.lock().unwrap().len(), 1);
    assert_eq!(ledger.relayed_count(), 0);
    assert_eq!(keystore.signed_count(), 0);
}

// =============================================================================
// Confirmation
// =============================================================================

#[tokio::test]
async fn confirmed_maps_receipt_timeout() {
    let (engine, _, _) = engine(MockLedger::new(vec![utxo(1, 0, ASSET, 10)]));

    let result = engine
        .transfer(one_transfer(4), TransactionOptions::default())
        .await
        .unwrap();
    let err = result
        .confirmed(Some(Duration::from_millis(10)))
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::ConfirmationTimeout));
}

#[tokio::test]
async fn confirmed_returns_receipt_when_included() {
    let mut ledger = MockLedger::new(vec![utxo(1, 0, ASSET, 10)]);
    ledger.receipt = Some(TransactionReceipt {
        block_index: 12345,
        block_hash: UInt256([0x99; 32]),
        transaction_index: 2,
    });
    let (engine, _, _) = engine(ledger);

    let result = engine
        .transfer(one_transfer(4), TransactionOptions::default())
        .await
        .unwrap();
    let receipt = result.confirmed(None).await.unwrap();
    assert_eq!(receipt.block_index, 12345);
}
