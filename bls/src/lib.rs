//! Short-signature (BLS) verification on BN254.
//!
//! Signatures live in G1 and public keys in G2, the layout used by the
//! drand `evmnet` style beacons. A signature `σ` over message `m` is valid
//! for key `pk` iff `e(σ, g2) == e(H(m), pk)`, where `H` is the map a
//! [`HashToCurve`] selects: try-and-increment ([`hash_to_point`]) or the
//! RFC 9380 SvdW construction drand's BN254 networks sign with.
//!
//! Nothing here keeps global state: curve constants are carried in an
//! explicit [`CurveParams`] value built once and passed down.

pub mod codec;
pub mod error;
pub mod hash_to_curve;
pub mod params;
pub mod signature;

pub use ark_bn254::{G1Affine, G2Affine};
pub use codec::{decode_g1, decode_g2, encode_g1, encode_g2, EncodedG1, EncodedG2};
pub use error::BlsError;
pub use hash_to_curve::{
    expand_message_xmd, hash_to_curve_svdw, hash_to_field, hash_to_point, map_to_curve_svdw,
    HashToCurve, Keccak256, XmdHash, DRAND_EVMNET_DST,
};
pub use params::{CurveParams, SvdwConstants};
pub use signature::{verify_encoded, verify_short_signature, SecretKey};
