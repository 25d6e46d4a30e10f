//! Base58check addresses.
//!
//! An address is a version byte followed by the 20-byte script hash of the
//! owning authority, with a 4-byte double-SHA256 checksum, base58 encoded.

use crate::hash::UInt160;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Address version byte for Meridian script-hash addresses.
pub const ADDRESS_VERSION: u8 = 0x17;

/// Checksum length appended before encoding.
const CHECKSUM_SIZE: usize = 4;

const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid base58 character '{0}'")]
    InvalidCharacter(char),

    #[error("address too short")]
    TooShort,

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("unexpected address version byte {0:#04x}")]
    Version(u8),
}

/// A spending authority on a specific ledger: the base58check form of a
/// script hash.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(UInt160);

impl Address {
    pub const fn from_script_hash(hash: UInt160) -> Self {
        Address(hash)
    }

    pub fn script_hash(&self) -> UInt160 {
        self.0
    }

    fn payload(&self) -> [u8; 21] {
        let mut payload = [0u8; 21];
        payload[0] = ADDRESS_VERSION;
        payload[1..].copy_from_slice(self.0.as_bytes());
        payload
    }
}

fn checksum(data: &[u8]) -> [u8; CHECKSUM_SIZE] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; CHECKSUM_SIZE];
    out.copy_from_slice(&second[..CHECKSUM_SIZE]);
    out
}

fn base58_encode(data: &[u8]) -> String {
    let mut digits: Vec<u8> = Vec::new();
    for &byte in data {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            carry += (*digit as u32) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }
    let leading_zeros = data.iter().take_while(|&&b| b == 0).count();
    let mut out = String::with_capacity(leading_zeros + digits.len());
    for _ in 0..leading_zeros {
        out.push(ALPHABET[0] as char);
    }
    for &digit in digits.iter().rev() {
        out.push(ALPHABET[digit as usize] as char);
    }
    out
}

fn base58_decode(s: &str) -> Result<Vec<u8>, AddressError> {
    let mut bytes: Vec<u8> = Vec::new();
    for c in s.chars() {
        let value = ALPHABET
            .iter()
            .position(|&a| a as char == c)
            .ok_or(AddressError::InvalidCharacter(c))? as u32;
        let mut carry = value;
        for byte in bytes.iter_mut() {
            carry += (*byte as u32) * 58;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }
    let leading_ones = s.chars().take_while(|&c| c == ALPHABET[0] as char).count();
    for _ in 0..leading_ones {
        bytes.push(0);
    }
    bytes.reverse();
    Ok(bytes)
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, AddressError> {
        let decoded = base58_decode(s)?;
        if decoded.len() != 21 + CHECKSUM_SIZE {
            return Err(AddressError::TooShort);
        }
        let (payload, check) = decoded.split_at(21);
        if checksum(payload) != check {
            return Err(AddressError::ChecksumMismatch);
        }
        if payload[0] != ADDRESS_VERSION {
            return Err(AddressError::Version(payload[0]));
        }
        let hash = UInt160::from_bytes(&payload[1..]).map_err(|_| AddressError::TooShort)?;
        Ok(Address(hash))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload = self.payload();
        let check = checksum(&payload);
        let mut full = Vec::with_capacity(payload.len() + CHECKSUM_SIZE);
        full.extend_from_slice(&payload);
        full.extend_from_slice(&check);
        f.write_str(&base58_encode(&full))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
