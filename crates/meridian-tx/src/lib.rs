//! Meridian transaction model.
//!
//! Typed transaction structures, the bit-exact wire serialization the relay
//! endpoint consumes, and a script builder for invocation scripts.

pub mod script;
pub mod types;
pub mod wire;

pub use script::{invoke_method_script, ContractParam, ScriptBuilder};
pub use types::{Attribute, AttributeUsage, Input, Output, Transaction, TxData, TxKind, Witness};
