//! Fixed-point ledger amounts.
//!
//! All value on the Meridian ledger is denominated in units of 10^-8. `Fixed8`
//! stores the raw integer count of those units, so arithmetic is exact and no
//! floating point ever enters fee or balance accounting. Amounts parse from
//! and display as decimal strings.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::Neg;
use std::str::FromStr;
use thiserror::Error;

/// Raw sub-units per whole ledger unit.
pub const UNITS_PER_WHOLE: i64 = 100_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Fixed8Error {
    #[error("invalid decimal string: {0}")]
    Invalid(String),

    #[error("too many decimal places (max 8): {0}")]
    Precision(String),

    #[error("amount overflow")]
    Overflow,
}

/// An exact ledger amount with 8 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fixed8(i64);

impl Fixed8 {
    pub const ZERO: Fixed8 = Fixed8(0);

    /// From a raw count of 10^-8 sub-units.
    pub const fn from_raw(raw: i64) -> Self {
        Fixed8(raw)
    }

    /// From a whole number of ledger units, saturating at the representable
    /// extremes.
    pub const fn from_whole(units: i64) -> Self {
        Fixed8(units.saturating_mul(UNITS_PER_WHOLE))
    }

    pub const fn raw(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, other: Fixed8) -> Result<Fixed8, Fixed8Error> {
        self.0
            .checked_add(other.0)
            .map(Fixed8)
            .ok_or(Fixed8Error::Overflow)
    }

    pub fn checked_sub(self, other: Fixed8) -> Result<Fixed8, Fixed8Error> {
        self.0
            .checked_sub(other.0)
            .map(Fixed8)
            .ok_or(Fixed8Error::Overflow)
    }

    /// Saturating subtraction, clamped at zero. Used where a deficit simply
    /// means "nothing left", never a negative balance.
    pub fn saturating_sub(self, other: Fixed8) -> Fixed8 {
        Fixed8(self.0.saturating_sub(other.0).max(0))
    }

    /// Round up to the next whole ledger unit. Gas consumed by an execution
    /// is charged in whole units.
    pub fn ceil(self) -> Fixed8 {
        let rem = self.0.rem_euclid(UNITS_PER_WHOLE);
        if rem == 0 {
            self
        } else {
            Fixed8(self.0 - rem + UNITS_PER_WHOLE)
        }
    }
}

impl Neg for Fixed8 {
    type Output = Fixed8;

    fn neg(self) -> Fixed8 {
        Fixed8(-self.0)
    }
}

impl Sum for Fixed8 {
    fn sum<I: Iterator<Item = Fixed8>>(iter: I) -> Fixed8 {
        iter.fold(Fixed8::ZERO, |acc, v| Fixed8(acc.0.saturating_add(v.0)))
    }
}

impl FromStr for Fixed8 {
    type Err = Fixed8Error;

    fn from_str(s: &str) -> Result<Self, Fixed8Error> {
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if body.is_empty() {
            return Err(Fixed8Error::Invalid(s.to_string()));
        }

        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };
        if frac_part.len() > 8 {
            return Err(Fixed8Error::Precision(s.to_string()));
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
            || (int_part.is_empty() && frac_part.is_empty())
        {
            return Err(Fixed8Error::Invalid(s.to_string()));
        }

        let whole: i64 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| Fixed8Error::Overflow)?
        };
        let mut frac: i64 = 0;
        if !frac_part.is_empty() {
            frac = frac_part.parse().map_err(|_| Fixed8Error::Overflow)?;
            frac *= 10i64.pow(8 - frac_part.len() as u32);
        }

        let raw = whole
            .checked_mul(UNITS_PER_WHOLE)
            .and_then(|w| w.checked_add(frac))
            .ok_or(Fixed8Error::Overflow)?;
        Ok(Fixed8(if negative { -raw } else { raw }))
    }
}

impl fmt::Display for Fixed8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / UNITS_PER_WHOLE as u64;
        let frac = abs % UNITS_PER_WHOLE as u64;
        if frac == 0 {
            return write!(f, "{}{}", sign, whole);
        }
        let frac_str = format!("{:08}", frac);
        write!(f, "{}{}.{}", sign, whole, frac_str.trim_end_matches('0'))
    }
}

impl Serialize for Fixed8 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Fixed8 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
