//! A single beacon key and its round schedule.

use crate::drand::DrandBeaconInfo;
use crate::error::BeaconError;
use rngate_bls::{
    decode_g2, verify_encoded, CurveParams, EncodedG1, EncodedG2, G2Affine, HashToCurve,
};
use rngate_types::{keccak256, keccak256_multi, KeyId, Timestamp, H256};

/// One beacon public key bound to its publication schedule.
///
/// Invariants (checked at construction): `genesis_time > 0`, `period > 0`,
/// and the key decodes to a valid, non-identity G2 point. Round messages are
/// mapped to G1 with try-and-increment unless another map is selected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Beacon {
    params: CurveParams,
    public_key: G2Affine,
    encoded_key: EncodedG2,
    key_id: KeyId,
    genesis_time: u64,
    period: u64,
    hash_to_curve: HashToCurve,
}

/// drand scheme id of the evmnet chain.
pub const SCHEME_BN254_UNCHAINED_ON_G1: &str = "bls-bn254-unchained-on-g1";

impl Beacon {
    pub fn new(
        params: CurveParams,
        public_key: EncodedG2,
        genesis_time: u64,
        period: u64,
    ) -> Result<Self, BeaconError> {
        let point =
            decode_g2(&public_key).map_err(|e| BeaconError::InvalidPublicKey(e.to_string()))?;
        if genesis_time == 0 || period == 0 {
            return Err(BeaconError::InvalidBeaconConfiguration {
                genesis_time,
                period,
            });
        }
        Ok(Self {
            params,
            public_key: point,
            encoded_key: public_key,
            key_id: key_id_of(&public_key),
            genesis_time,
            period,
            hash_to_curve: HashToCurve::default(),
        })
    }

    /// Use `map` to hash round messages to G1.
    pub fn with_hash_to_curve(mut self, map: HashToCurve) -> Self {
        self.hash_to_curve = map;
        self
    }

    /// Build a beacon from a drand chain info document.
    ///
    /// `bls-bn254-unchained-on-g1` selects the evmnet SVDW map. A document
    /// without a scheme keeps the default map; any other scheme is refused.
    pub fn from_info(params: CurveParams, info: &DrandBeaconInfo) -> Result<Self, BeaconError> {
        let map = match info.scheme.as_deref() {
            None => HashToCurve::default(),
            Some(SCHEME_BN254_UNCHAINED_ON_G1) => HashToCurve::drand_evmnet(),
            Some(other) => return Err(BeaconError::UnsupportedScheme(other.to_string())),
        };
        let key = EncodedG2::from_hex(&info.public_key)
            .map_err(|e| BeaconError::InvalidPublicKey(e.to_string()))?;
        Ok(Self::new(params, key, info.genesis_time, info.period)?.with_hash_to_curve(map))
    }

    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    pub fn public_key(&self) -> &G2Affine {
        &self.public_key
    }

    pub fn encoded_public_key(&self) -> &EncodedG2 {
        &self.encoded_key
    }

    pub fn genesis_time(&self) -> Timestamp {
        Timestamp::new(self.genesis_time)
    }

    pub fn period(&self) -> u64 {
        self.period
    }

    pub fn hash_to_curve(&self) -> &HashToCurve {
        &self.hash_to_curve
    }

    /// Round whose signature satisfies `deadline`:
    /// `ceil((deadline - genesis) / period)`.
    pub fn round(&self, deadline: Timestamp) -> Result<u64, BeaconError> {
        round_for(self.genesis_time, deadline.as_secs(), self.period).ok_or(
            BeaconError::InvalidDeadline {
                deadline,
                genesis: self.genesis_time(),
            },
        )
    }

    /// Time at which the beacon publishes `round` (round 1 at genesis).
    pub fn time_of_round(&self, round: u64) -> Timestamp {
        Timestamp::new(
            self.genesis_time
                .saturating_add(round.saturating_sub(1).saturating_mul(self.period)),
        )
    }

    pub fn is_round_available(&self, round: u64, now: Timestamp) -> bool {
        self.time_of_round(round) <= now
    }

    /// Verify that `signature` is this key's signature over `round`.
    ///
    /// Every failure (malformed point, off-curve, wrong signer) is reported as
    /// [`BeaconError::InvalidSignature`].
    pub fn verify_round(&self, round: u64, signature: &EncodedG1) -> Result<(), BeaconError> {
        let message = round_message(round);
        verify_encoded(
            &self.params,
            &self.hash_to_curve,
            &message,
            signature,
            &self.public_key,
        )
        .map_err(|e| {
            tracing::debug!(round, key_id = %self.key_id, reason = %e, "beacon signature rejected");
            BeaconError::InvalidSignature
        })
    }
}

/// Pure round formula; `None` when `deadline < genesis` or `period == 0`.
pub fn round_for(genesis: u64, deadline: u64, period: u64) -> Option<u64> {
    if period == 0 {
        return None;
    }
    let delta = deadline.checked_sub(genesis)?;
    Some(delta.div_ceil(period))
}

/// The message a beacon signs for `round`: `keccak256(round as 8-byte BE)`.
pub fn round_message(round: u64) -> [u8; 32] {
    keccak256(&round.to_be_bytes())
}

/// Key id: `keccak256(x.c0 || x.c1 || y.c0 || y.c1)`.
pub fn key_id_of(public_key: &EncodedG2) -> KeyId {
    let [a, b, c, d] = public_key.to_native_words();
    H256::new(keccak256_multi(&[&a, &b, &c, &d]))
}
