//! Curve constants for BN254 (alt_bn128).

use ark_bn254::{Fq, G1Affine, G2Affine};
use ark_ec::AffineRepr;
use ark_ff::MontFp;

/// `(p + 1) / 4` for the BN254 base field, as little-endian 64-bit limbs.
///
/// `p ≡ 3 (mod 4)`, so `a^((p+1)/4)` is a square root of `a` whenever one exists.
const SQRT_EXPONENT: [u64; 4] = [
    0x4f08_2305_b61f_3f52,
    0x65e0_5aa4_5a1c_72a3,
    0x6e14_116d_a060_5617,
    0x0c19_139c_b84c_680a,
];

/// Upper bound on try-and-increment steps; each step succeeds with
/// probability ~1/2.
const MAX_HASH_ATTEMPTS: u32 = 256;

/// Shallue-van de Woestijne constants for `y^2 = x^3 + 3` with `Z = 1`,
/// as defined in RFC 9380 section 6.6.1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SvdwConstants {
    pub z: Fq,
    /// `g(Z)`
    pub c1: Fq,
    /// `-Z / 2`
    pub c2: Fq,
    /// `sqrt(-g(Z) * 3Z^2)`, the root with `sgn0 == 0`.
    pub c3: Fq,
    /// `-4 g(Z) / 3Z^2`
    pub c4: Fq,
}

impl SvdwConstants {
    pub const BN254: Self = Self {
        z: MontFp!("1"),
        c1: MontFp!("4"),
        c2: MontFp!(
            "10944121435919637611123202872628637544348155578648911831344518947322613104291"
        ),
        c3: MontFp!("8815841940592487685674414971303048083897117035520822607866"),
        c4: MontFp!(
            "7296080957279758407415468581752425029565437052432607887563012631548408736189"
        ),
    };
}

/// Immutable curve configuration shared by the verifier and every beacon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurveParams {
    /// Generator of G1.
    pub g1: G1Affine,
    /// Generator of G2 (the EIP-197 generator).
    pub g2: G2Affine,
    /// `b` in `y^2 = x^3 + b`.
    pub curve_b: Fq,
    /// Exponent used by the square-root test in hash-to-curve.
    pub sqrt_exponent: [u64; 4],
    pub max_hash_attempts: u32,
    pub svdw: SvdwConstants,
}

impl CurveParams {
    pub fn bn254() -> Self {
        Self {
            g1: G1Affine::generator(),
            g2: G2Affine::generator(),
            curve_b: Fq::from(3u64),
            sqrt_exponent: SQRT_EXPONENT,
            max_hash_attempts: MAX_HASH_ATTEMPTS,
            svdw: SvdwConstants::BN254,
        }
    }
}

impl Default for CurveParams {
    fn default() -> Self {
        Self::bn254()
    }
}
