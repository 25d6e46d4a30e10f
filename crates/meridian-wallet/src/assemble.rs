//! Transaction assembly helpers.
//!
//! Attribute construction (engine tag, nonce, memo, invocation fingerprint)
//! and the builtin-call payloads for publishing contracts and registering
//! assets.

use meridian_tx::{Attribute, ContractParam, ScriptBuilder};
use meridian_types::{Address, Fixed8, UInt160};
use rand::Rng;
use serde_json::json;

/// Tag stamped on every transaction this engine builds.
pub const ENGINE_TAG: &[u8] = b"meridian-rs";

/// Prefix of the deterministic invocation fingerprint.
const INVOKE_TAG: &str = "meridian-invoke";

/// The engine fingerprint attribute.
pub fn engine_attribute() -> Attribute {
    Attribute::remark15(ENGINE_TAG.to_vec())
}

/// A random nonce attribute, making otherwise identical invocation drafts
/// hash differently.
pub fn nonce_attribute() -> Attribute {
    let nonce: u32 = rand::thread_rng().gen();
    Attribute::remark15(format!("{nonce:010}").into_bytes())
}

/// The user-supplied memo as a description attribute.
pub fn memo_attribute(memo: &str) -> Attribute {
    Attribute::description(memo)
}

/// Deterministic fingerprint of an invocation: contract, method, and the
/// named arguments, JSON-encoded behind the engine prefix. Off-chain
/// consumers decode the call from the attribute instead of disassembling
/// the script.
pub fn invoke_fingerprint(
    contract: UInt160,
    method: &str,
    named_params: &[(String, ContractParam)],
) -> Attribute {
    let params: Vec<serde_json::Value> = named_params
        .iter()
        .map(|(name, param)| json!([name, param.to_json()]))
        .collect();
    let body = json!({
        "contract": contract.to_hex(),
        "method": method,
        "params": params,
    });
    Attribute::remark14(format!("{INVOKE_TAG}:{body}").into_bytes())
}

/// Attributes attached to an invocation: the fingerprint, plus an
/// authorization tag for the contract itself when the call must pass its
/// verification trigger.
pub fn invoke_attributes(
    contract: UInt160,
    method: &str,
    named_params: &[(String, ContractParam)],
    verify: bool,
    sender: Option<&Address>,
) -> Vec<Attribute> {
    let mut attributes = vec![invoke_fingerprint(contract, method, named_params)];
    if verify {
        attributes.push(Attribute::script(contract));
    }
    if let Some(sender) = sender {
        attributes.push(Attribute::script(sender.script_hash()));
    }
    attributes
}

// =============================================================================
// Builtin-call payloads
// =============================================================================

/// Everything needed to deploy a contract on chain.
#[derive(Debug, Clone)]
pub struct ContractRegister {
    pub script: Vec<u8>,
    pub name: String,
    pub code_version: String,
    pub author: String,
    pub email: String,
    pub description: String,
    pub has_storage: bool,
    pub has_dynamic_invoke: bool,
    pub payable: bool,
}

impl ContractRegister {
    fn properties(&self) -> i64 {
        let mut bits = 0;
        if self.has_storage {
            bits |= 1;
        }
        if self.has_dynamic_invoke {
            bits |= 1 << 1;
        }
        if self.payable {
            bits |= 1 << 2;
        }
        bits
    }
}

/// The script that deploys `contract` via the builtin create call.
pub fn publish_script(contract: &ContractRegister) -> Vec<u8> {
    let mut sb = ScriptBuilder::new();
    sb.emit_sys_call(
        "Meridian.Contract.Create",
        &[
            ContractParam::Bytes(contract.script.clone()),
            ContractParam::Int(contract.properties()),
            ContractParam::String(contract.name.clone()),
            ContractParam::String(contract.code_version.clone()),
            ContractParam::String(contract.author.clone()),
            ContractParam::String(contract.email.clone()),
            ContractParam::String(contract.description.clone()),
        ],
    );
    sb.build()
}

/// Ledger-level classification of a registered asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Credit,
    Duty,
    Governing,
    Utility,
    Currency,
    Share,
    Invoice,
    Token,
}

impl AssetKind {
    pub fn code(&self) -> i64 {
        match self {
            AssetKind::Credit => 0x40,
            AssetKind::Duty => 0x80,
            AssetKind::Governing => 0x00,
            AssetKind::Utility => 0x01,
            AssetKind::Currency => 0x08,
            AssetKind::Share => 0x90,
            AssetKind::Invoice => 0x98,
            AssetKind::Token => 0x60,
        }
    }
}

/// Everything needed to register a new asset ledger.
#[derive(Debug, Clone)]
pub struct AssetRegister {
    pub kind: AssetKind,
    pub name: String,
    /// Total issuance cap.
    pub amount: Fixed8,
    pub precision: u8,
    /// Owner public key, encoded.
    pub owner: Vec<u8>,
    pub admin: Address,
    pub issuer: Address,
}

/// The script that registers `asset` via the builtin create call.
pub fn register_asset_script(asset: &AssetRegister) -> Vec<u8> {
    let mut sb = ScriptBuilder::new();
    sb.emit_sys_call(
        "Meridian.Asset.Create",
        &[
            ContractParam::Int(asset.kind.code()),
            ContractParam::String(asset.name.clone()),
            ContractParam::Amount(asset.amount),
            ContractParam::Int(asset.precision as i64),
            ContractParam::Bytes(asset.owner.clone()),
            ContractParam::Hash160(asset.admin.script_hash()),
            ContractParam::Hash160(asset.issuer.script_hash()),
        ],
    );
    sb.build()
}
