//! Invocation script builder.
//!
//! Emits VM bytecode for contract method calls and builtin system calls.
//! Arguments are pushed in reverse so the callee pops them in declared order.

use meridian_types::{Fixed8, UInt160, UInt256};
use serde_json::Value;

pub mod op {
    pub const PUSH0: u8 = 0x00;
    pub const PUSHDATA1: u8 = 0x4c;
    pub const PUSHDATA2: u8 = 0x4d;
    pub const PUSHDATA4: u8 = 0x4e;
    pub const PUSHM1: u8 = 0x4f;
    pub const PUSH1: u8 = 0x51;
    pub const PUSH16: u8 = 0x60;
    pub const APPCALL: u8 = 0x67;
    pub const SYSCALL: u8 = 0x68;
    pub const DROP: u8 = 0x75;
    pub const PACK: u8 = 0xc1;
    pub const THROWIFNOT: u8 = 0xf1;
}

/// A typed argument to a contract method or system call.
#[derive(Debug, Clone, PartialEq)]
pub enum ContractParam {
    Bool(bool),
    Int(i64),
    Amount(Fixed8),
    Bytes(Vec<u8>),
    String(String),
    Hash160(UInt160),
    Hash256(UInt256),
    Array(Vec<ContractParam>),
}

impl ContractParam {
    /// JSON form used by the deterministic invocation fingerprint.
    pub fn to_json(&self) -> Value {
        match self {
            ContractParam::Bool(b) => Value::Bool(*b),
            ContractParam::Int(i) => Value::String(i.to_string()),
            ContractParam::Amount(a) => Value::String(a.to_string()),
            ContractParam::Bytes(b) => Value::String(hex::encode(b)),
            ContractParam::String(s) => Value::String(s.clone()),
            ContractParam::Hash160(h) => Value::String(h.to_hex()),
            ContractParam::Hash256(h) => Value::String(h.to_hex()),
            ContractParam::Array(items) => {
                Value::Array(items.iter().map(ContractParam::to_json).collect())
            }
        }
    }
}

/// Accumulates VM bytecode.
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    buf: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> ScriptBuilder {
        ScriptBuilder::default()
    }

    pub fn emit_op(&mut self, opcode: u8) -> &mut Self {
        self.buf.push(opcode);
        self
    }

    pub fn emit_push_bool(&mut self, value: bool) -> &mut Self {
        self.emit_op(if value { op::PUSH1 } else { op::PUSH0 })
    }

    pub fn emit_push_int(&mut self, value: i64) -> &mut Self {
        match value {
            -1 => self.emit_op(op::PUSHM1),
            0 => self.emit_op(op::PUSH0),
            1..=16 => self.emit_op(op::PUSH1 + (value as u8) - 1),
            _ => {
                // Minimal little-endian two's-complement encoding.
                let mut bytes = value.to_le_bytes().to_vec();
                let sign_fill = if value < 0 { 0xff } else { 0x00 };
                while bytes.len() > 1 && bytes[bytes.len() - 1] == sign_fill {
                    let top = bytes[bytes.len() - 2];
                    if (value < 0) == (top & 0x80 != 0) {
                        bytes.pop();
                    } else {
                        break;
                    }
                }
                self.emit_push_bytes(&bytes)
            }
        }
    }

    pub fn emit_push_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        let len = bytes.len();
        if len < op::PUSHDATA1 as usize {
            self.buf.push(len as u8);
        } else if len <= 0xff {
            self.buf.push(op::PUSHDATA1);
            self.buf.push(len as u8);
        } else if len <= 0xffff {
            self.buf.push(op::PUSHDATA2);
            self.buf.extend_from_slice(&(len as u16).to_le_bytes());
        } else {
            self.buf.push(op::PUSHDATA4);
            self.buf.extend_from_slice(&(len as u32).to_le_bytes());
        }
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn emit_push_string(&mut self, s: &str) -> &mut Self {
        self.emit_push_bytes(s.as_bytes())
    }

    pub fn emit_push_param(&mut self, param: &ContractParam) -> &mut Self {
        match param {
            ContractParam::Bool(b) => self.emit_push_bool(*b),
            ContractParam::Int(i) => self.emit_push_int(*i),
            ContractParam::Amount(a) => self.emit_push_int(a.raw()),
            ContractParam::Bytes(b) => self.emit_push_bytes(b),
            ContractParam::String(s) => self.emit_push_string(s),
            ContractParam::Hash160(h) => self.emit_push_bytes(h.as_bytes()),
            ContractParam::Hash256(h) => self.emit_push_bytes(h.as_bytes()),
            ContractParam::Array(items) => {
                for item in items.iter().rev() {
                    self.emit_push_param(item);
                }
                self.emit_push_int(items.len() as i64);
                self.emit_op(op::PACK)
            }
        }
    }

    /// Call `method` on the contract at `hash`: arguments packed into one
    /// array, method name pushed, then APPCALL.
    pub fn emit_app_call(
        &mut self,
        hash: UInt160,
        method: &str,
        params: &[ContractParam],
    ) -> &mut Self {
        for param in params.iter().rev() {
            self.emit_push_param(param);
        }
        self.emit_push_int(params.len() as i64);
        self.emit_op(op::PACK);
        self.emit_push_string(method);
        self.emit_op(op::APPCALL);
        self.buf.extend_from_slice(hash.as_bytes());
        self
    }

    /// Invoke a builtin system call by name.
    pub fn emit_sys_call(&mut self, name: &str, params: &[ContractParam]) -> &mut Self {
        for param in params.iter().rev() {
            self.emit_push_param(param);
        }
        self.emit_op(op::SYSCALL);
        self.buf.push(name.len() as u8);
        self.buf.extend_from_slice(name.as_bytes());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.buf.clone()
    }
}

/// The script for invoking `method` on `contract` with `params`.
pub fn invoke_method_script(
    contract: UInt160,
    method: &str,
    params: &[ContractParam],
) -> Vec<u8> {
    let mut sb = ScriptBuilder::new();
    sb.emit_app_call(contract, method, params);
    sb.build()
}
