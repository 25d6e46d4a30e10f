//! Typed transaction structures.
//!
//! A [`Transaction`] is an immutable value: every build step that changes it
//! produces a new transaction via the `with_*` constructors rather than
//! mutating in place, so a partially updated draft can never leak into a
//! relay call.

use meridian_types::{Fixed8, UInt160, UInt256};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::wire;

/// Transaction kind discriminator (the first wire byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Issue,
    Claim,
    Contract,
    Invocation,
}

impl TxKind {
    pub fn wire_byte(&self) -> u8 {
        match self {
            TxKind::Issue => 0x01,
            TxKind::Claim => 0x02,
            TxKind::Contract => 0x80,
            TxKind::Invocation => 0xd1,
        }
    }
}

/// Reference to a spendable output of a prior transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Input {
    pub tx_hash: UInt256,
    pub index: u16,
}

/// A produced output: value on an asset ledger assigned to an authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub asset: UInt256,
    pub value: Fixed8,
    pub address: UInt160,
}

/// Non-value metadata tag usage discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeUsage {
    /// Authorize the named script hash (20-byte payload).
    Script,
    /// Free-form description (var-bytes payload).
    Description,
    /// Invocation fingerprint (var-bytes payload).
    Remark14,
    /// Engine fingerprint and nonces (var-bytes payload).
    Remark15,
}

impl AttributeUsage {
    pub fn wire_byte(&self) -> u8 {
        match self {
            AttributeUsage::Script => 0x20,
            AttributeUsage::Description => 0x90,
            AttributeUsage::Remark14 => 0xfe,
            AttributeUsage::Remark15 => 0xff,
        }
    }
}

/// A metadata tag attached to a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub usage: AttributeUsage,
    pub data: Vec<u8>,
}

impl Attribute {
    /// An authorization tag naming a script hash.
    pub fn script(hash: UInt160) -> Attribute {
        Attribute {
            usage: AttributeUsage::Script,
            data: hash.as_bytes().to_vec(),
        }
    }

    pub fn description(text: &str) -> Attribute {
        Attribute {
            usage: AttributeUsage::Description,
            data: text.as_bytes().to_vec(),
        }
    }

    pub fn remark14(data: Vec<u8>) -> Attribute {
        Attribute {
            usage: AttributeUsage::Remark14,
            data,
        }
    }

    pub fn remark15(data: Vec<u8>) -> Attribute {
        Attribute {
            usage: AttributeUsage::Remark15,
            data,
        }
    }

    /// The authorized script hash, when this is a Script tag.
    pub fn script_hash(&self) -> Option<UInt160> {
        if self.usage != AttributeUsage::Script {
            return None;
        }
        UInt160::from_bytes(&self.data).ok()
    }
}

/// Signature authorizing consumption of inputs by one script hash.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Witness {
    pub invocation: Vec<u8>,
    pub verification: Vec<u8>,
}

/// Kind-specific transaction payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxData {
    Contract,
    Issue,
    Claim { claims: Vec<Input> },
    Invocation { script: Vec<u8>, gas: Fixed8 },
}

impl TxData {
    pub fn kind(&self) -> TxKind {
        match self {
            TxData::Contract => TxKind::Contract,
            TxData::Issue => TxKind::Issue,
            TxData::Claim { .. } => TxKind::Claim,
            TxData::Invocation { .. } => TxKind::Invocation,
        }
    }
}

/// An unsigned or signed transaction draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: u8,
    pub data: TxData,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    pub attributes: Vec<Attribute>,
    pub witnesses: Vec<Witness>,
}

impl Transaction {
    pub fn new(
        version: u8,
        data: TxData,
        inputs: Vec<Input>,
        outputs: Vec<Output>,
        attributes: Vec<Attribute>,
    ) -> Transaction {
        Transaction {
            version,
            data,
            inputs,
            outputs,
            attributes,
            witnesses: Vec::new(),
        }
    }

    pub fn kind(&self) -> TxKind {
        self.data.kind()
    }

    /// Claim inputs, if this is a claim transaction.
    pub fn claims(&self) -> &[Input] {
        match &self.data {
            TxData::Claim { claims } => claims,
            _ => &[],
        }
    }

    /// Script-authorization tags present on this transaction.
    pub fn script_attributes(&self) -> Vec<UInt160> {
        self.attributes
            .iter()
            .filter_map(Attribute::script_hash)
            .collect()
    }

    /// A copy with the witness list replaced.
    pub fn with_witnesses(&self, witnesses: Vec<Witness>) -> Transaction {
        Transaction {
            witnesses,
            ..self.clone()
        }
    }

    /// A copy with additional attributes appended.
    pub fn with_attributes(&self, extra: Vec<Attribute>) -> Transaction {
        let mut tx = self.clone();
        tx.attributes.extend(extra);
        tx
    }

    /// Serialization over which signatures are computed.
    pub fn serialize_unsigned(&self) -> Vec<u8> {
        wire::serialize_unsigned(self)
    }

    /// Full wire serialization including witnesses, as consumed by relay.
    pub fn serialize_wire(&self) -> Vec<u8> {
        wire::serialize_wire(self)
    }

    pub fn unsigned_hex(&self) -> String {
        hex::encode(self.serialize_unsigned())
    }

    pub fn wire_hex(&self) -> String {
        hex::encode(self.serialize_wire())
    }

    /// Transaction id: double SHA-256 of the unsigned serialization.
    pub fn hash(&self) -> UInt256 {
        let first = Sha256::digest(self.serialize_unsigned());
        let second = Sha256::digest(first);
        let mut out = [0u8; 32];
        out.copy_from_slice(&second);
        UInt256(out)
    }
}
