//! Keccak-256 hashing and the 32-byte word encoding used for commitments.

use crate::address::Address;
use crate::error::TypesError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tiny_keccak::{Hasher, Keccak};

/// A 32-byte digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct H256([u8; 32]);

impl H256 {
    pub const ZERO: Self = Self([0u8; 32]);

    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H256({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for H256 {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|e| TypesError::InvalidHex(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| TypesError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }
}

impl From<[u8; 32]> for H256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for H256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for H256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Compute the Keccak-256 hash of arbitrary data.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    keccak256_multi(&[data])
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn keccak256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Builds a sequence of 32-byte big-endian words and hashes it.
///
/// Integers and addresses are left-padded to a full word; digests are
/// appended as-is. The layout matches the standard ABI encoding of static
/// types, so commitments can be recomputed by any external tool.
#[derive(Default)]
pub struct WordEncoder {
    buf: Vec<u8>,
}

impl WordEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uint(mut self, value: u64) -> Self {
        self.push_uint(value as u128);
        self
    }

    pub fn uint128(mut self, value: u128) -> Self {
        self.push_uint(value);
        self
    }

    pub fn address(mut self, address: &Address) -> Self {
        self.buf.extend_from_slice(&address.to_word());
        self
    }

    pub fn word(mut self, word: &[u8; 32]) -> Self {
        self.buf.extend_from_slice(word);
        self
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn keccak(&self) -> H256 {
        H256(keccak256(&self.buf))
    }

    fn push_uint(&mut self, value: u128) {
        self.buf.extend_from_slice(&[0u8; 16]);
        self.buf.extend_from_slice(&value.to_be_bytes());
    }
}
