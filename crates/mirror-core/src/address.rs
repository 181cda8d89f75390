//! Identity types
//!
//! Owners, principals, admins, and mirrors are all identified by a 20-byte
//! [`Address`] written as `0x` followed by 40 hex digits. Two addresses are
//! reserved: [`Address::ZERO`] and [`SENTINEL`], the terminator of the owner
//! linked list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Length of an address in bytes
pub const ADDRESS_LEN: usize = 20;

/// Reserved terminator of the owner linked list (`0x00..01`)
pub const SENTINEL: Address = {
    let mut bytes = [0u8; ADDRESS_LEN];
    bytes[ADDRESS_LEN - 1] = 1;
    Address(bytes)
};

/// A 20-byte identity
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The zero address
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Create an address from raw bytes
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes of the address
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn is_sentinel(&self) -> bool {
        *self == SENTINEL
    }

    /// True for addresses that may appear in an owner list
    pub fn is_assignable(&self) -> bool {
        !self.is_zero() && !self.is_sentinel()
    }

    /// Abbreviated form for display, e.g. `0x1234…abcd`
    pub fn abbreviated(&self) -> String {
        let full = self.to_string();
        format!("{}…{}", &full[..6], &full[full.len() - 4..])
    }
}

impl FromStr for Address {
    type Err = Error;

    /// Parse `0x` + 40 hex digits, case-insensitive
    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| Error::invalid_address(s))?;
        if digits.len() != ADDRESS_LEN * 2 {
            return Err(Error::invalid_address(s));
        }

        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| Error::invalid_address(s))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The identity of a mirror
///
/// A mirror's id doubles as its own address, which can never be one of its
/// owners.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MirrorId(Address);

impl MirrorId {
    pub const fn new(address: Address) -> Self {
        Self(address)
    }

    pub fn as_address(&self) -> Address {
        self.0
    }
}

impl From<Address> for MirrorId {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl FromStr for MirrorId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse().map(Self)
    }
}

impl fmt::Display for MirrorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for MirrorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MirrorId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_case_and_prints_lowercase() {
        let addr: Address = "0xAbCdEf0123456789aBcDeF0123456789ABCDEF01".parse().unwrap();
        assert_eq!(
            addr.to_string(),
            "0xabcdef0123456789abcdef0123456789abcdef01"
        );
    }

    #[test]
    fn rejects_malformed_input() {
        for input in [
            "",
            "0x",
            "abcdef0123456789abcdef0123456789abcdef01",
            "0xabcdef0123456789abcdef0123456789abcdef0",
            "0xabcdef0123456789abcdef0123456789abcdef012",
            "0xzzcdef0123456789abcdef0123456789abcdef01",
        ] {
            let err = input.parse::<Address>().unwrap_err();
            assert!(
                matches!(err, Error::InvalidAddress { .. }),
                "expected InvalidAddress for {input:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn sentinel_is_one() {
        assert_eq!(
            SENTINEL.to_string(),
            "0x0000000000000000000000000000000000000001"
        );
        assert!(SENTINEL.is_sentinel());
        assert!(!SENTINEL.is_assignable());
        assert!(!Address::ZERO.is_assignable());
    }

    #[test]
    fn abbreviated_keeps_prefix_and_suffix() {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[0] = 0x12;
        bytes[1] = 0x34;
        bytes[18] = 0xab;
        bytes[19] = 0xcd;
        let addr = Address::from_bytes(bytes);
        assert_eq!(addr.abbreviated(), "0x1234…abcd");
    }

    #[test]
    fn serializes_as_string() {
        let addr = SENTINEL;
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x0000000000000000000000000000000000000001\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
