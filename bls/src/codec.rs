//! Fixed big-endian point encoding.
//!
//! - Field element: 32 bytes, big-endian, must be `< p`.
//! - G1: `x || y` (64 bytes).
//! - G2: `x.c1 || x.c0 || y.c1 || y.c0` (128 bytes). This is the order drand
//!   publishes public keys in and the order of the EIP-197 precompile input.
//!   The native coefficient order `[x.c0, x.c1, y.c0, y.c1]` is available via
//!   [`EncodedG2::to_native_words`].
//!
//! Decoding validates curve membership and, for G2, subgroup membership.
//! `decode(encode(p)) == p` and `encode(decode(b)) == b` for every valid input.

use crate::error::BlsError;
use ark_bn254::{Fq, Fq2, G1Affine, G2Affine};
use ark_ff::{BigInt, BigInteger, PrimeField};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const FIELD_BYTES: usize = 32;
pub const G1_BYTES: usize = 2 * FIELD_BYTES;
pub const G2_BYTES: usize = 4 * FIELD_BYTES;

/// Wire encoding of a G1 point (a beacon signature).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodedG1(pub [u8; G1_BYTES]);

/// Wire encoding of a G2 point (a beacon public key).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodedG2(pub [u8; G2_BYTES]);

impl EncodedG1 {
    pub fn from_words(x: [u8; 32], y: [u8; 32]) -> Self {
        let mut bytes = [0u8; G1_BYTES];
        bytes[..32].copy_from_slice(&x);
        bytes[32..].copy_from_slice(&y);
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, BlsError> {
        let arr: [u8; G1_BYTES] = bytes.try_into().map_err(|_| BlsError::InvalidLength {
            expected: G1_BYTES,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn from_hex(s: &str) -> Result<Self, BlsError> {
        Self::from_slice(&decode_hex(s)?)
    }

    pub fn x_word(&self) -> [u8; 32] {
        word_at(&self.0, 0)
    }

    pub fn y_word(&self) -> [u8; 32] {
        word_at(&self.0, 1)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl EncodedG2 {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, BlsError> {
        let arr: [u8; G2_BYTES] = bytes.try_into().map_err(|_| BlsError::InvalidLength {
            expected: G2_BYTES,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn from_hex(s: &str) -> Result<Self, BlsError> {
        Self::from_slice(&decode_hex(s)?)
    }

    /// Coefficients in native order: `[x.c0, x.c1, y.c0, y.c1]`.
    pub fn to_native_words(&self) -> [[u8; 32]; 4] {
        [
            word_at(&self.0, 1),
            word_at(&self.0, 0),
            word_at(&self.0, 3),
            word_at(&self.0, 2),
        ]
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Decode and validate a G1 point. The point at infinity is rejected.
pub fn decode_g1(encoded: &EncodedG1) -> Result<G1Affine, BlsError> {
    let x = fq_from_be(&encoded.x_word())?;
    let y = fq_from_be(&encoded.y_word())?;
    let point = G1Affine::new_unchecked(x, y);
    if !point.is_on_curve() {
        return Err(BlsError::NotOnCurve);
    }
    if !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(BlsError::NotInSubgroup);
    }
    Ok(point)
}

/// Decode and validate a G2 point. The all-zero encoding is reported as
/// [`BlsError::IdentityPoint`].
pub fn decode_g2(encoded: &EncodedG2) -> Result<G2Affine, BlsError> {
    if encoded.is_zero() {
        return Err(BlsError::IdentityPoint);
    }
    let [x_c0, x_c1, y_c0, y_c1] = encoded.to_native_words();
    let x = Fq2::new(fq_from_be(&x_c0)?, fq_from_be(&x_c1)?);
    let y = Fq2::new(fq_from_be(&y_c0)?, fq_from_be(&y_c1)?);
    let point = G2Affine::new_unchecked(x, y);
    if !point.is_on_curve() {
        return Err(BlsError::NotOnCurve);
    }
    if !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(BlsError::NotInSubgroup);
    }
    Ok(point)
}

/// Encode a finite G1 point.
pub fn encode_g1(point: &G1Affine) -> EncodedG1 {
    EncodedG1::from_words(fq_to_be(&point.x), fq_to_be(&point.y))
}

/// Encode a finite G2 point in wire order.
pub fn encode_g2(point: &G2Affine) -> EncodedG2 {
    let mut bytes = [0u8; G2_BYTES];
    bytes[0..32].copy_from_slice(&fq_to_be(&point.x.c1));
    bytes[32..64].copy_from_slice(&fq_to_be(&point.x.c0));
    bytes[64..96].copy_from_slice(&fq_to_be(&point.y.c1));
    bytes[96..128].copy_from_slice(&fq_to_be(&point.y.c0));
    EncodedG2(bytes)
}

fn fq_from_be(bytes: &[u8; 32]) -> Result<Fq, BlsError> {
    let mut limbs = [0u64; 4];
    for (i, chunk) in bytes.chunks_exact(8).enumerate() {
        let mut limb = [0u8; 8];
        limb.copy_from_slice(chunk);
        limbs[3 - i] = u64::from_be_bytes(limb);
    }
    Fq::from_bigint(BigInt::new(limbs)).ok_or(BlsError::NonCanonicalFieldElement)
}

fn fq_to_be(element: &Fq) -> [u8; 32] {
    let bytes = element.into_bigint().to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

fn word_at(bytes: &[u8], index: usize) -> [u8; 32] {
    let mut word = [0u8; 32];
    word.copy_from_slice(&bytes[index * 32..(index + 1) * 32]);
    word
}

fn decode_hex(s: &str) -> Result<Vec<u8>, BlsError> {
    let raw = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(raw).map_err(|e| BlsError::InvalidHex(e.to_string()))
}

impl fmt::Debug for EncodedG1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedG1({}..)", hex::encode(&self.0[..4]))
    }
}

impl fmt::Debug for EncodedG2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedG2({}..)", hex::encode(&self.0[..4]))
    }
}

impl Serialize for EncodedG1 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for EncodedG1 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for EncodedG2 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for EncodedG2 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
