//! Binary wire format.
//!
//! Field order is fixed and must be reproduced bit-exactly for the relay
//! endpoint to accept a transaction: kind, version, kind-specific payload,
//! attributes, inputs, outputs, then witnesses (signed form only). Integers
//! are little-endian; variable-length collections carry a var-int count.

use crate::types::{Attribute, AttributeUsage, Input, Output, Transaction, TxData, Witness};

/// Little-endian var-int as used across the wire format.
pub fn write_varint(buf: &mut Vec<u8>, value: u64) {
    if value < 0xfd {
        buf.push(value as u8);
    } else if value <= 0xffff {
        buf.push(0xfd);
        buf.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xffff_ffff {
        buf.push(0xfe);
        buf.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        buf.push(0xff);
        buf.extend_from_slice(&value.to_le_bytes());
    }
}

/// Length-prefixed byte string.
pub fn write_var_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    write_varint(buf, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn write_input(buf: &mut Vec<u8>, input: &Input) {
    buf.extend_from_slice(input.tx_hash.as_bytes());
    buf.extend_from_slice(&input.index.to_le_bytes());
}

fn write_output(buf: &mut Vec<u8>, output: &Output) {
    buf.extend_from_slice(output.asset.as_bytes());
    buf.extend_from_slice(&output.value.raw().to_le_bytes());
    buf.extend_from_slice(output.address.as_bytes());
}

fn write_attribute(buf: &mut Vec<u8>, attribute: &Attribute) {
    buf.push(attribute.usage.wire_byte());
    match attribute.usage {
        // Script payloads are a fixed 20 bytes, written raw.
        AttributeUsage::Script => buf.extend_from_slice(&attribute.data),
        AttributeUsage::Description | AttributeUsage::Remark14 | AttributeUsage::Remark15 => {
            write_var_bytes(buf, &attribute.data)
        }
    }
}

fn write_witness(buf: &mut Vec<u8>, witness: &Witness) {
    write_var_bytes(buf, &witness.invocation);
    write_var_bytes(buf, &witness.verification);
}

/// Serialization over which signatures are computed (no witnesses).
pub fn serialize_unsigned(tx: &Transaction) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.push(tx.kind().wire_byte());
    buf.push(tx.version);

    match &tx.data {
        TxData::Contract | TxData::Issue => {}
        TxData::Claim { claims } => {
            write_varint(&mut buf, claims.len() as u64);
            for claim in claims {
                write_input(&mut buf, claim);
            }
        }
        TxData::Invocation { script, gas } => {
            write_var_bytes(&mut buf, script);
            if tx.version >= 1 {
                buf.extend_from_slice(&gas.raw().to_le_bytes());
            }
        }
    }

    write_varint(&mut buf, tx.attributes.len() as u64);
    for attribute in &tx.attributes {
        write_attribute(&mut buf, attribute);
    }
    write_varint(&mut buf, tx.inputs.len() as u64);
    for input in &tx.inputs {
        write_input(&mut buf, input);
    }
    write_varint(&mut buf, tx.outputs.len() as u64);
    for output in &tx.outputs {
        write_output(&mut buf, output);
    }

    buf
}

/// Full signed serialization: unsigned form followed by the witness list.
pub fn serialize_wire(tx: &Transaction) -> Vec<u8> {
    let mut buf = serialize_unsigned(tx);
    write_varint(&mut buf, tx.witnesses.len() as u64);
    for witness in &tx.witnesses {
        write_witness(&mut buf, witness);
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_types::{Fixed8, UInt160, UInt256};

    #[test]
    fn varint_boundaries() {
        let mut buf = Vec::new();
        write_varint(&mut buf, 0xfc);
        assert_eq!(buf, vec![0xfc]);

        buf.clear();
        write_varint(&mut buf, 0xfd);
        assert_eq!(buf, vec![0xfd, 0xfd, 0x00]);

        buf.clear();
        write_varint(&mut buf, 0x1_0000);
        assert_eq!(buf, vec![0xfe, 0x00, 0x00, 0x01, 0x00]);

        buf.clear();
        write_varint(&mut buf, 0x1_0000_0000);
        assert_eq!(buf[0], 0xff);
        assert_eq!(buf.len(), 9);
    }

    #[test]
    fn var_bytes_prefixes_length() {
        let mut buf = Vec::new();
        write_var_bytes(&mut buf, b"abc");
        assert_eq!(buf, vec![3, b'a', b'b', b'c']);
    }

    #[test]
    fn contract_transaction_layout() {
        let tx = Transaction::new(
            0,
            TxData::Contract,
            vec![Input {
                tx_hash: UInt256([0x11; 32]),
                index: 2,
            }],
            vec![Output {
                asset: UInt256([0x22; 32]),
                value: Fixed8::from_whole(1),
                address: UInt160([0x33; 20]),
            }],
            vec![],
        );
        let bytes = serialize_unsigned(&tx);

        assert_eq!(bytes[0], 0x80); // kind
        assert_eq!(bytes[1], 0x00); // version
        assert_eq!(bytes[2], 0x00); // attribute count
        assert_eq!(bytes[3], 0x01); // input count
        assert_eq!(&bytes[4..36], &[0x11; 32]);
        assert_eq!(&bytes[36..38], &2u16.to_le_bytes());
        assert_eq!(bytes[38], 0x01); // output count
        assert_eq!(&bytes[39..71], &[0x22; 32]);
        assert_eq!(&bytes[71..79], &100_000_000i64.to_le_bytes());
        assert_eq!(&bytes[79..99], &[0x33; 20]);
        assert_eq!(bytes.len(), 99);
    }

    #[test]
    fn script_attribute_written_raw() {
        let tx = Transaction::new(
            0,
            TxData::Contract,
            vec![],
            vec![],
            vec![Attribute::script(UInt160([0x44; 20]))],
        );
        let bytes = serialize_unsigned(&tx);
        // kind, version, count=1, usage, 20 raw bytes (no length prefix).
        assert_eq!(bytes[2], 1);
        assert_eq!(bytes[3], 0x20);
        assert_eq!(&bytes[4..24], &[0x44; 20]);
    }

    #[test]
    fn remark_attribute_length_prefixed() {
        let tx = Transaction::new(
            0,
            TxData::Contract,
            vec![],
            vec![],
            vec![Attribute::remark15(b"meridian-rs".to_vec())],
        );
        let bytes = serialize_unsigned(&tx);
        assert_eq!(bytes[3], 0xff);
        assert_eq!(bytes[4], 11);
        assert_eq!(&bytes[5..16], b"meridian-rs");
    }

    #[test]
    fn invocation_carries_script_and_gas() {
        let tx = Transaction::new(
            1,
            TxData::Invocation {
                script: vec![0x51],
                gas: Fixed8::from_whole(2),
            },
            vec![],
            vec![],
            vec![],
        );
        let bytes = serialize_unsigned(&tx);
        assert_eq!(bytes[0], 0xd1);
        assert_eq!(bytes[1], 1);
        assert_eq!(bytes[2], 1); // script length
        assert_eq!(bytes[3], 0x51);
        assert_eq!(&bytes[4..12], &200_000_000i64.to_le_bytes());
    }

    #[test]
    fn version_zero_invocation_omits_gas() {
        let tx = Transaction::new(
            0,
            TxData::Invocation {
                script: vec![0x51],
                gas: Fixed8::from_whole(2),
            },
            vec![],
            vec![],
            vec![],
        );
        let bytes = serialize_unsigned(&tx);
        // kind, version, script, attr count, input count, output count.
        assert_eq!(bytes.len(), 2 + 2 + 3);
    }

    #[test]
    fn claim_lists_claims_before_attributes() {
        let tx = Transaction::new(
            0,
            TxData::Claim {
                claims: vec![Input {
                    tx_hash: UInt256([0x55; 32]),
                    index: 0,
                }],
            },
            vec![],
            vec![],
            vec![],
        );
        let bytes = serialize_unsigned(&tx);
        assert_eq!(bytes[0], 0x02);
        assert_eq!(bytes[2], 1); // claim count
        assert_eq!(&bytes[3..35], &[0x55; 32]);
    }

    #[test]
    fn wire_form_appends_witnesses() {
        let tx = Transaction::new(0, TxData::Contract, vec![], vec![], vec![]).with_witnesses(
            vec![Witness {
                invocation: vec![0xaa],
                verification: vec![0xbb, 0xcc],
            }],
        );
        let unsigned = serialize_unsigned(&tx);
        let wire = serialize_wire(&tx);
        assert_eq!(&wire[..unsigned.len()], &unsigned[..]);
        assert_eq!(
            &wire[unsigned.len()..],
            &[0x01, 0x01, 0xaa, 0x02, 0xbb, 0xcc]
        );
    }
}
