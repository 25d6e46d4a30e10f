//! Fixed-size hash types.
//!
//! `UInt160` identifies a spending authority (a script hash); `UInt256`
//! identifies transactions and asset ledgers. Both serialize as lowercase hex
//! strings in JSON and as raw bytes on the wire.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid hash length: expected {expected}, got {got}")]
    Length { expected: usize, got: usize },
}

macro_rules! hash_type {
    ($name:ident, $size:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub [u8; $size]);

        impl $name {
            pub const SIZE: usize = $size;

            pub const fn zero() -> Self {
                Self([0u8; $size])
            }

            pub fn from_bytes(bytes: &[u8]) -> Result<Self, HashError> {
                if bytes.len() != $size {
                    return Err(HashError::Length {
                        expected: $size,
                        got: bytes.len(),
                    });
                }
                let mut out = [0u8; $size];
                out.copy_from_slice(bytes);
                Ok(Self(out))
            }

            pub fn as_bytes(&self) -> &[u8; $size] {
                &self.0
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl FromStr for $name {
            type Err = HashError;

            fn from_str(s: &str) -> Result<Self, HashError> {
                let s = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(s)?;
                Self::from_bytes(&bytes)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.to_hex())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(D::Error::custom)
            }
        }
    };
}

hash_type!(UInt160, 20, "A 160-bit hash (script hash / spending authority).");
hash_type!(UInt256, 32, "A 256-bit hash (transaction id / asset id).");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_roundtrip() {
        let h: UInt160 = "0102030405060708090a0b0c0d0e0f1011121314".parse().unwrap();
        assert_eq!(h.to_hex(), "0102030405060708090a0b0c0d0e0f1011121314");
        assert_eq!(h.0[0], 1);
        assert_eq!(h.0[19], 0x14);
    }

    #[test]
    fn accepts_0x_prefix() {
        let a: UInt256 = format!("0x{}", "ab".repeat(32)).parse().unwrap();
        assert_eq!(a.0[0], 0xab);
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(matches!(
            "0102".parse::<UInt160>(),
            Err(HashError::Length { expected: 20, got: 2 })
        ));
    }

    #[test]
    fn ordering_is_lexicographic() {
        let lo = UInt160([0u8; 20]);
        let mut hi = [0u8; 20];
        hi[0] = 1;
        assert!(lo < UInt160(hi));
    }

    #[test]
    fn serde_json_roundtrip() {
        let h: UInt256 = "aa".repeat(32).parse().unwrap();
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{}\"", "aa".repeat(32)));
        let back: UInt256 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }
}
