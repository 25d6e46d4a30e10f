//! The transaction engine.
//!
//! One engine owns a keystore, a ledger provider, and the pending-spend
//! tracker, and exposes the operations a wallet performs: value transfers,
//! reward claims, asset issuance and registration, contract publication,
//! and contract invocation. Every operation follows the same path: resolve
//! the sender, fund the transaction, sign, relay, reserve the spent
//! outputs.

use crate::assemble::{
    engine_attribute, invoke_attributes, memo_attribute, publish_script, register_asset_script,
    AssetRegister, ContractRegister,
};
use crate::error::WalletError;
use crate::invoke::{build_priced_invocation, DRY_RUN_GAS};
use crate::keystore::KeyStore;
use crate::pending::PendingSpends;
use crate::provider::LedgerProvider;
use crate::result::{InvokeResult, TransactionResult};
use crate::select::Transfer;
use crate::snapshot::fund_transfers;
use crate::witness::finish_witnesses;
use meridian_rpc::{InvocationOutcome, RpcError};
use meridian_tx::{
    invoke_method_script, Attribute, ContractParam, Input, Output, ScriptBuilder, Transaction,
    TxData, Witness,
};
use meridian_types::{
    AccountId, Address, Fixed8, UInt160, UInt256, ISSUE_TRANSACTION_FEE, UTILITY_ASSET,
};
use std::sync::Arc;

const VALUE_TX_VERSION: u8 = 0;
const INVOCATION_VERSION: u8 = 1;

/// Per-operation options common to every engine call.
#[derive(Debug, Clone, Default)]
pub struct TransactionOptions {
    /// Sender account; the keystore's current account when absent.
    pub from: Option<AccountId>,
    /// Extra attributes to stamp on the transaction.
    pub attributes: Vec<Attribute>,
    /// Priority fee in the utility asset.
    pub network_fee: Fixed8,
}

/// A requested payment to one destination.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub to: Address,
    pub asset: UInt256,
    pub amount: Fixed8,
    pub memo: Option<String>,
}

/// A requested issuance of registered-asset units to one destination.
#[derive(Debug, Clone)]
pub struct IssueRequest {
    pub to: Address,
    pub asset: UInt256,
    pub amount: Fixed8,
}

/// Client-side transaction engine over a keystore and a node.
pub struct TransactionEngine<K, P> {
    keystore: Arc<K>,
    provider: Arc<P>,
    pending: PendingSpends,
}

impl<K: KeyStore, P: LedgerProvider> TransactionEngine<K, P> {
    pub fn new(keystore: Arc<K>, provider: Arc<P>) -> Self {
        Self {
            keystore,
            provider,
            pending: PendingSpends::new(),
        }
    }

    pub fn current_account(&self) -> Option<AccountId> {
        self.keystore.current_account()
    }

    pub fn accounts(&self) -> Vec<AccountId> {
        self.keystore.accounts()
    }

    /// Outputs currently reserved by relayed-but-unconfirmed transactions.
    pub fn reserved_count(&self) -> usize {
        self.pending.reserved_count()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Send value to one or more destinations.
    pub async fn transfer(
        &self,
        transfers: Vec<TransferRequest>,
        options: TransactionOptions,
    ) -> Result<TransactionResult<P>, WalletError> {
        let account = self.resolve_sender(&options)?;
        let mut attributes = self.base_attributes(&options);
        for request in &transfers {
            if let Some(memo) = &request.memo {
                attributes.push(memo_attribute(memo));
            }
        }

        let plain: Vec<Transfer> = transfers
            .iter()
            .map(|t| Transfer::new(t.to, t.asset, t.amount))
            .collect();
        let coverage = fund_transfers(
            &*self.provider,
            &self.pending,
            &account.address,
            &plain,
            options.network_fee,
        )
        .await?;
        if coverage.inputs.is_empty() {
            return Err(WalletError::NothingToTransfer);
        }

        let tx = Transaction::new(
            VALUE_TX_VERSION,
            TxData::Contract,
            coverage.input_refs(),
            coverage.outputs,
            attributes,
        );
        self.send(account, tx).await
    }

    /// Claim the accrued utility reward for the sender.
    pub async fn claim(
        &self,
        options: TransactionOptions,
    ) -> Result<TransactionResult<P>, WalletError> {
        let account = self.resolve_sender(&options)?;
        let attributes = self.base_attributes(&options);

        let claimable = self.provider.get_claimable(&account.address).await?;
        if claimable.claims.is_empty() {
            return Err(WalletError::NothingToClaim);
        }

        let coverage = fund_transfers(
            &*self.provider,
            &self.pending,
            &account.address,
            &[],
            options.network_fee,
        )
        .await?;
        let mut outputs = coverage.outputs.clone();
        outputs.push(Output {
            asset: UTILITY_ASSET,
            value: claimable.amount,
            address: account.address.script_hash(),
        });

        let claims: Vec<Input> = claimable
            .claims
            .iter()
            .map(|c| Input {
                tx_hash: c.tx_hash,
                index: c.index,
            })
            .collect();
        let tx = Transaction::new(
            VALUE_TX_VERSION,
            TxData::Claim { claims },
            coverage.input_refs(),
            outputs,
            attributes,
        );
        self.send(account, tx).await
    }

    /// Issue units of a registered asset. The sender pays the network's
    /// issuance fee on top of any priority fee.
    pub async fn issue(
        &self,
        issues: Vec<IssueRequest>,
        options: TransactionOptions,
    ) -> Result<TransactionResult<P>, WalletError> {
        if issues.is_empty() {
            return Err(WalletError::NothingToIssue);
        }
        let account = self.resolve_sender(&options)?;
        let attributes = self.base_attributes(&options);

        let issuance_fee = match self.provider.get_fee_schedule().await {
            Ok(schedule) => schedule.issuance_fee,
            Err(e) => {
                log::warn!("fee schedule unavailable ({e}), using default issuance fee");
                ISSUE_TRANSACTION_FEE
            }
        };
        let fee = options.network_fee.checked_add(issuance_fee)?;

        let coverage = fund_transfers(
            &*self.provider,
            &self.pending,
            &account.address,
            &[],
            fee,
        )
        .await?;
        if coverage.inputs.is_empty() {
            return Err(WalletError::NothingToIssue);
        }

        let mut outputs = coverage.outputs.clone();
        outputs.extend(issues.iter().map(|issue| Output {
            asset: issue.asset,
            value: issue.amount,
            address: issue.to.script_hash(),
        }));

        let tx = Transaction::new(
            VALUE_TX_VERSION,
            TxData::Issue,
            coverage.input_refs(),
            outputs,
            attributes,
        );
        self.send(account, tx).await
    }

    /// Invoke `method` on a deployed contract. `named_params` feed the
    /// off-chain fingerprint; `verify` additionally routes the call through
    /// the contract's verification trigger.
    pub async fn invoke(
        &self,
        contract: UInt160,
        method: &str,
        params: Vec<ContractParam>,
        named_params: Vec<(String, ContractParam)>,
        verify: bool,
        options: TransactionOptions,
    ) -> Result<InvokeResult<P>, WalletError> {
        let account = self.resolve_sender(&options)?;
        let mut attributes = self.base_attributes(&options);
        attributes.extend(invoke_attributes(
            contract,
            method,
            &named_params,
            verify,
            None,
        ));

        let placeholder_witnesses = if verify {
            vec![verification_placeholder(method, &params)]
        } else {
            Vec::new()
        };

        let script = invoke_method_script(contract, method, &params);
        let tx = build_priced_invocation(
            &*self.provider,
            &self.pending,
            &account.address,
            script,
            &[],
            attributes,
            placeholder_witnesses,
            options.network_fee,
        )
        .await?;
        let result = self.send(account, tx).await?;
        Ok(InvokeResult::new(result))
    }

    /// Deploy a contract.
    pub async fn publish(
        &self,
        contract: ContractRegister,
        options: TransactionOptions,
    ) -> Result<InvokeResult<P>, WalletError> {
        self.invoke_script(publish_script(&contract), options).await
    }

    /// Register a new asset ledger.
    pub async fn register_asset(
        &self,
        asset: AssetRegister,
        options: TransactionOptions,
    ) -> Result<InvokeResult<P>, WalletError> {
        self.invoke_script(register_asset_script(&asset), options)
            .await
    }

    /// Read-only contract call: dry-run only, nothing relayed, nothing
    /// signed. Faults come back in the outcome rather than as errors.
    pub async fn call(
        &self,
        contract: UInt160,
        method: &str,
        params: Vec<ContractParam>,
    ) -> Result<InvocationOutcome, WalletError> {
        let script = invoke_method_script(contract, method, &params);
        let tx = Transaction::new(
            INVOCATION_VERSION,
            TxData::Invocation {
                script,
                gas: DRY_RUN_GAS,
            },
            vec![],
            vec![],
            vec![],
        );
        Ok(self.provider.test_invoke(&tx.wire_hex()).await?)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn invoke_script(
        &self,
        script: Vec<u8>,
        options: TransactionOptions,
    ) -> Result<InvokeResult<P>, WalletError> {
        let account = self.resolve_sender(&options)?;
        let attributes = self.base_attributes(&options);
        let tx = build_priced_invocation(
            &*self.provider,
            &self.pending,
            &account.address,
            script,
            &[],
            attributes,
            Vec::new(),
            options.network_fee,
        )
        .await?;
        let result = self.send(account, tx).await?;
        Ok(InvokeResult::new(result))
    }

    fn resolve_sender(&self, options: &TransactionOptions) -> Result<AccountId, WalletError> {
        let account = options
            .from
            .or_else(|| self.keystore.current_account())
            .ok_or(WalletError::NoAccount)?;
        if account.network != self.provider.network() {
            return Err(WalletError::Rpc(RpcError::UnknownNetwork(account.network)));
        }
        Ok(account)
    }

    fn base_attributes(&self, options: &TransactionOptions) -> Vec<Attribute> {
        let mut attributes = options.attributes.clone();
        attributes.push(engine_attribute());
        attributes
    }

    /// Sign, relay, and reserve. The one path every operation exits through.
    async fn send(
        &self,
        account: AccountId,
        tx: Transaction,
    ) -> Result<TransactionResult<P>, WalletError> {
        let spender = account.address.script_hash();

        // With no inputs and no claims, nothing on the wire names the
        // sender; an explicit authorization tag makes the ledger check the
        // sender's witness anyway.
        let tx = if tx.inputs.is_empty() && tx.claims().is_empty() {
            tx.with_attributes(vec![Attribute::script(spender)])
        } else {
            tx
        };

        let witness = self.keystore.sign(&account, &tx.unsigned_hex()).await?;
        let signed = finish_witnesses(&tx, spender, witness)?;

        let relayed = self.provider.relay_transaction(&signed.wire_hex()).await?;
        self.pending.reserve(&signed.inputs);
        log::info!(
            "relayed {:?} transaction {} with {} input(s)",
            signed.kind(),
            relayed.tx_hash,
            signed.inputs.len()
        );

        Ok(TransactionResult::new(
            signed,
            relayed.tx_hash,
            Arc::clone(&self.provider),
        ))
    }
}

/// Stand-in witness for a contract that verifies the invocation itself: the
/// invocation script re-states the call, the verification script is the
/// contract's own.
fn verification_placeholder(method: &str, params: &[ContractParam]) -> Witness {
    let mut sb = ScriptBuilder::new();
    for param in params.iter().rev() {
        sb.emit_push_param(param);
    }
    sb.emit_push_string(method);
    Witness {
        invocation: sb.build(),
        verification: Vec::new(),
    }
}
