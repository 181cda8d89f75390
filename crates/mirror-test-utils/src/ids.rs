//! Deterministic addresses for tests.

use mirror_core::Address;

/// Directory admin used by fixtures.
pub const ADMIN: Address = fixed(0xad);

/// Default principal used by fixtures.
pub const PRINCIPAL: Address = fixed(0xcc);

const fn fixed(tag: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[0] = 0xf0;
    bytes[19] = tag;
    Address::from_bytes(bytes)
}

/// Owner address number `n`: `0xa0…00nn`.
///
/// Never zero or the sentinel, and never equal to [`ADMIN`] or [`PRINCIPAL`].
pub fn addr(n: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[0] = 0xa0;
    bytes[19] = n;
    Address::from_bytes(bytes)
}

/// Owner addresses for each of `ns`, in order.
pub fn addrs(ns: &[u8]) -> Vec<Address> {
    ns.iter().map(|n| addr(*n)).collect()
}
