//! Short-signature verification and a signing key for test harnesses.

use crate::codec::{decode_g1, EncodedG1};
use crate::error::BlsError;
use crate::hash_to_curve::HashToCurve;
use crate::params::CurveParams;
use ark_bn254::{Bn254, Fr, G1Affine, G2Affine};
use ark_ec::pairing::Pairing;
use ark_ec::CurveGroup;
use ark_ff::{BigInteger, PrimeField, Zero};
use rngate_types::keccak256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Check `e(signature, g2) == e(H(message), public_key)`, with `H` chosen
/// by `map`.
///
/// Points that are off-curve, outside the prime-order subgroup, or at
/// infinity are rejected before any pairing is computed.
pub fn verify_short_signature(
    params: &CurveParams,
    map: &HashToCurve,
    message: &[u8],
    signature: &G1Affine,
    public_key: &G2Affine,
) -> bool {
    if !is_valid_g1(signature) || !is_valid_g2(public_key) {
        return false;
    }
    let Ok(hashed) = map.map(params, message) else {
        return false;
    };
    Bn254::pairing(*signature, params.g2) == Bn254::pairing(hashed, *public_key)
}

/// Decode `signature` and verify it. Malformed encodings and mismatching
/// signatures are reported as distinct errors here; callers that must not
/// leak which check failed collapse them.
pub fn verify_encoded(
    params: &CurveParams,
    map: &HashToCurve,
    message: &[u8],
    signature: &EncodedG1,
    public_key: &G2Affine,
) -> Result<(), BlsError> {
    let point = decode_g1(signature)?;
    if verify_short_signature(params, map, message, &point, public_key) {
        Ok(())
    } else {
        Err(BlsError::SignatureMismatch)
    }
}

fn is_valid_g1(point: &G1Affine) -> bool {
    !point.infinity && point.is_on_curve() && point.is_in_correct_subgroup_assuming_on_curve()
}

fn is_valid_g2(point: &G2Affine) -> bool {
    !point.infinity && point.is_on_curve() && point.is_in_correct_subgroup_assuming_on_curve()
}

/// A beacon signing key.
///
/// Used by test harnesses and local simulation to produce beacon outputs;
/// the coordinator itself only ever verifies. Stored as the reduced
/// big-endian scalar and zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Derive a key as `keccak256(seed) mod r`.
    pub fn from_seed(seed: &[u8]) -> Result<Self, BlsError> {
        let scalar = Fr::from_be_bytes_mod_order(&keccak256(seed));
        if scalar.is_zero() {
            return Err(BlsError::ZeroSecretKey);
        }
        let bytes = scalar.into_bigint().to_bytes_be();
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(&bytes);
        Ok(Self(out))
    }

    pub fn public_key(&self, params: &CurveParams) -> G2Affine {
        (params.g2 * self.scalar()).into_affine()
    }

    /// Sign `message`: `σ = sk · H(message)`.
    pub fn sign(
        &self,
        params: &CurveParams,
        map: &HashToCurve,
        message: &[u8],
    ) -> Result<G1Affine, BlsError> {
        let hashed = map.map(params, message)?;
        Ok((hashed * self.scalar()).into_affine())
    }

    fn scalar(&self) -> Fr {
        Fr::from_be_bytes_mod_order(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_g1;

    #[test]
    fn valid_signature_verifies() {
        let params = CurveParams::bn254();
        let map = HashToCurve::default();
        let sk = SecretKey::from_seed(b"beacon").unwrap();
        let pk = sk.public_key(&params);
        let sig = sk.sign(&params, &map, b"hello").unwrap();
        assert!(verify_short_signature(&params, &map, b"hello", &sig, &pk));
    }

    #[test]
    fn wrong_message_rejected() {
        let params = CurveParams::bn254();
        let map = HashToCurve::default();
        let sk = SecretKey::from_seed(b"beacon").unwrap();
        let pk = sk.public_key(&params);
        let sig = sk.sign(&params, &map, b"hello").unwrap();
        assert!(!verify_short_signature(&params, &map, b"goodbye", &sig, &pk));
    }

    #[test]
    fn wrong_key_rejected() {
        let params = CurveParams::bn254();
        let map = HashToCurve::default();
        let signer = SecretKey::from_seed(b"beacon").unwrap();
        let other = SecretKey::from_seed(b"impostor").unwrap();
        let sig = other.sign(&params, &map, b"hello").unwrap();
        let pk = signer.public_key(&params);
        assert!(!verify_short_signature(&params, &map, b"hello", &sig, &pk));
        assert_eq!(
            verify_encoded(&params, &map, b"hello", &encode_g1(&sig), &pk),
            Err(BlsError::SignatureMismatch)
        );
    }

    #[test]
    fn off_curve_signature_rejected_before_pairing() {
        let params = CurveParams::bn254();
        let map = HashToCurve::default();
        let pk = SecretKey::from_seed(b"beacon").unwrap().public_key(&params);
        let mut x = [0u8; 32];
        x[31] = 2;
        let bogus = EncodedG1::from_words(x, x);
        assert_eq!(
            verify_encoded(&params, &map, b"hello", &bogus, &pk),
            Err(BlsError::NotOnCurve)
        );
    }

    #[test]
    fn identity_key_rejected() {
        let params = CurveParams::bn254();
        let map = HashToCurve::default();
        let sk = SecretKey::from_seed(b"beacon").unwrap();
        let sig = sk.sign(&params, &map, b"hello").unwrap();
        assert!(!verify_short_signature(
            &params,
            &map,
            b"hello",
            &sig,
            &G2Affine::identity()
        ));
    }

    #[test]
    fn evmnet_signature_known_answer() {
        let params = CurveParams::bn254();
        let map = HashToCurve::drand_evmnet();
        let sk = SecretKey::from_seed(b"evmnet").unwrap();
        let message = keccak256(&1u64.to_be_bytes());
        let sig = sk.sign(&params, &map, &message).unwrap();
        assert_eq!(
            encode_g1(&sig).to_hex(),
            "0a70e20e283df678888bb1300e4ae2a4ae2606cad005761a11aa3761c49104f7\
             199d398a0aafb794efc14032ed6523bbc93461754e61d5a93d8b11818badf16a"
        );
        let pk = sk.public_key(&params);
        assert!(verify_short_signature(&params, &map, &message, &sig, &pk));
    }

    #[test]
    fn signature_is_bound_to_the_map() {
        let params = CurveParams::bn254();
        let sk = SecretKey::from_seed(b"beacon").unwrap();
        let pk = sk.public_key(&params);
        let legacy = HashToCurve::default();
        let evmnet = HashToCurve::drand_evmnet();
        let sig = sk.sign(&params, &evmnet, b"hello").unwrap();
        assert!(verify_short_signature(&params, &evmnet, b"hello", &sig, &pk));
        assert!(!verify_short_signature(&params, &legacy, b"hello", &sig, &pk));
        let other_dst = HashToCurve::Svdw {
            dst: "BLS_SIG_BN254G1_XMD:KECCAK-256_SVDW_RO_OTHER_".into(),
        };
        assert!(!verify_short_signature(&params, &other_dst, b"hello", &sig, &pk));
    }
}
