//! Maps from bytes to G1 points.
//!
//! Two constructions are supported:
//!
//! - **Try-and-increment**: `x = keccak256(message) mod p`; while `x^3 + 3`
//!   is not a square, `x += 1`. The `y` coordinate is `(x^3 + 3)^((p+1)/4)`,
//!   taken as-is (no sign normalisation). This is the default.
//! - **RFC 9380** `hash_to_curve` with `expand_message_xmd` and the
//!   Shallue-van de Woestijne map (the `_RO_` variant). drand's BN254
//!   networks use it with Keccak-256 and [`DRAND_EVMNET_DST`].
//!
//! Neither is constant-time: inputs are public.

use crate::error::BlsError;
use crate::params::CurveParams;
use ark_bn254::{Fq, G1Affine};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{BigInteger, Field, One, PrimeField, Zero};
use rngate_types::{keccak256, keccak256_multi};
use serde::{Deserialize, Serialize};

/// Domain separation tag of the drand `evmnet` beacon.
pub const DRAND_EVMNET_DST: &str = "BLS_SIG_BN254G1_XMD:KECCAK-256_SVDW_RO_NUL_";

/// Bytes drawn per field element in `hash_to_field`:
/// `ceil((ceil(log2 p) + 128) / 8)`.
const FIELD_EXPANSION: usize = 48;

const OVERSIZE_DST_PREFIX: &[u8] = b"H2C-OVERSIZE-DST-";

/// Which map a beacon's signers apply to the round message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "map", rename_all = "snake_case")]
pub enum HashToCurve {
    #[default]
    TryAndIncrement,
    /// RFC 9380 with Keccak-256 `expand_message_xmd` and the SvdW map.
    Svdw { dst: String },
}

impl HashToCurve {
    /// The map drand's `bls-bn254-unchained-on-g1` scheme signs with.
    pub fn drand_evmnet() -> Self {
        Self::Svdw {
            dst: DRAND_EVMNET_DST.to_string(),
        }
    }

    /// Map `message` to a point in G1.
    pub fn map(&self, params: &CurveParams, message: &[u8]) -> Result<G1Affine, BlsError> {
        match self {
            Self::TryAndIncrement => hash_to_point(params, message),
            Self::Svdw { dst } => {
                hash_to_curve_svdw::<Keccak256>(params, message, dst.as_bytes())
            }
        }
    }
}

/// Try-and-increment map from an arbitrary message to a point in G1.
pub fn hash_to_point(params: &CurveParams, message: &[u8]) -> Result<G1Affine, BlsError> {
    let digest = keccak256(message);
    let mut x = Fq::from_be_bytes_mod_order(&digest);

    for _ in 0..params.max_hash_attempts {
        let rhs = x.square() * x + params.curve_b;
        let y = rhs.pow(params.sqrt_exponent);
        if y.square() == rhs {
            return Ok(G1Affine::new_unchecked(x, y));
        }
        x += Fq::one();
    }

    Err(BlsError::HashToCurveExhausted(params.max_hash_attempts))
}

/// A 32-byte-output hash usable by `expand_message_xmd`.
pub trait XmdHash {
    /// Input block size (`s_in_bytes`).
    const BLOCK_BYTES: usize;

    fn digest(parts: &[&[u8]]) -> [u8; 32];
}

/// Keccak-256, block size 136.
pub struct Keccak256;

impl XmdHash for Keccak256 {
    const BLOCK_BYTES: usize = 136;

    fn digest(parts: &[&[u8]]) -> [u8; 32] {
        keccak256_multi(parts)
    }
}

/// RFC 9380 section 5.3.1.
pub fn expand_message_xmd<H: XmdHash>(
    message: &[u8],
    dst: &[u8],
    len: usize,
) -> Result<Vec<u8>, BlsError> {
    let ell = len.div_ceil(32);
    if ell == 0 || ell > 255 || len > usize::from(u16::MAX) {
        return Err(BlsError::InvalidExpandLength(len));
    }
    if dst.is_empty() {
        return Err(BlsError::InvalidDst("empty".into()));
    }

    let oversize;
    let dst = if dst.len() > 255 {
        oversize = H::digest(&[OVERSIZE_DST_PREFIX, dst]);
        &oversize[..]
    } else {
        dst
    };
    let dst_len = [dst.len() as u8];
    let z_pad = vec![0u8; H::BLOCK_BYTES];
    let len_bytes = (len as u16).to_be_bytes();

    let b0 = H::digest(&[&z_pad, message, &len_bytes, &[0], dst, &dst_len]);
    let mut bi = H::digest(&[&b0, &[1], dst, &dst_len]);
    let mut out = Vec::with_capacity(ell * 32);
    out.extend_from_slice(&bi);
    for i in 2..=ell {
        let mut mixed = [0u8; 32];
        for (m, (a, b)) in mixed.iter_mut().zip(b0.iter().zip(bi.iter())) {
            *m = a ^ b;
        }
        bi = H::digest(&[&mixed, &[i as u8], dst, &dst_len]);
        out.extend_from_slice(&bi);
    }
    out.truncate(len);
    Ok(out)
}

/// `hash_to_field` with `count = 2`.
pub fn hash_to_field<H: XmdHash>(message: &[u8], dst: &[u8]) -> Result<[Fq; 2], BlsError> {
    let uniform = expand_message_xmd::<H>(message, dst, 2 * FIELD_EXPANSION)?;
    let (a, b) = uniform.split_at(FIELD_EXPANSION);
    Ok([
        Fq::from_be_bytes_mod_order(a),
        Fq::from_be_bytes_mod_order(b),
    ])
}

/// Shallue-van de Woestijne map of one field element onto the curve
/// (RFC 9380 section 6.6.1, straight-line form).
pub fn map_to_curve_svdw(params: &CurveParams, u: Fq) -> G1Affine {
    let c = &params.svdw;
    let g = |x: Fq| x.square() * x + params.curve_b;

    let tv1 = u.square() * c.c1;
    let tv2 = Fq::one() + tv1;
    let tv1 = Fq::one() - tv1;
    let tv3 = (tv1 * tv2).inverse().unwrap_or_else(Fq::zero);
    let tv4 = u * tv1 * tv3 * c.c3;

    let x1 = c.c2 - tv4;
    let x2 = c.c2 + tv4;
    let x3 = (tv2.square() * tv3).square() * c.c4 + c.z;

    let x = if sqrt(params, g(x1)).is_some() {
        x1
    } else if sqrt(params, g(x2)).is_some() {
        x2
    } else {
        x3
    };
    // One of the three candidates always has a square `g(x)`.
    let mut y = sqrt(params, g(x)).unwrap_or_else(Fq::zero);
    if sgn0(&u) != sgn0(&y) {
        y = -y;
    }
    G1Affine::new_unchecked(x, y)
}

/// RFC 9380 `hash_to_curve` (random-oracle variant) with the SvdW map.
/// G1 has cofactor 1, so no clearing step is needed.
pub fn hash_to_curve_svdw<H: XmdHash>(
    params: &CurveParams,
    message: &[u8],
    dst: &[u8],
) -> Result<G1Affine, BlsError> {
    let [u0, u1] = hash_to_field::<H>(message, dst)?;
    let q0 = map_to_curve_svdw(params, u0);
    let q1 = map_to_curve_svdw(params, u1);
    let point = (q0 + q1).into_affine();
    if point.is_zero() {
        return Err(BlsError::IdentityPoint);
    }
    Ok(point)
}

fn sqrt(params: &CurveParams, a: Fq) -> Option<Fq> {
    let y = a.pow(params.sqrt_exponent);
    (y.square() == a).then_some(y)
}

fn sgn0(a: &Fq) -> bool {
    a.into_bigint().is_odd()
}
