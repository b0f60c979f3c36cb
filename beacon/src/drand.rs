//! drand HTTP JSON documents.
//!
//! Only the shapes are modelled here; fetching them is left to whoever
//! submits fulfillments.

use crate::error::BeaconError;
use rngate_bls::EncodedG1;
use serde::{Deserialize, Serialize};

/// Chain info as served by `/v2/beacons/{id}/info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrandBeaconInfo {
    /// Hex-encoded G2 public key, wire order `x.c1 || x.c0 || y.c1 || y.c0`.
    pub public_key: String,
    /// Seconds between rounds.
    pub period: u64,
    /// UNIX timestamp of round 1.
    pub genesis_time: u64,
    #[serde(default)]
    pub genesis_seed: Option<String>,
    #[serde(default)]
    pub chain_hash: Option<String>,
    #[serde(default)]
    pub scheme: Option<String>,
    #[serde(default)]
    pub beacon_id: Option<String>,
}

/// A published round as served by `/v2/beacons/{id}/rounds/{round}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrandRound {
    pub round: u64,
    /// Hex-encoded G1 signature, `x || y`.
    pub signature: String,
}

impl DrandRound {
    pub fn signature(&self) -> Result<EncodedG1, BeaconError> {
        EncodedG1::from_hex(&self.signature).map_err(|e| BeaconError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Beacon;
    use rngate_bls::{encode_g2, CurveParams, HashToCurve, SecretKey};

    fn info_for(seed: &[u8], scheme: Option<&str>) -> DrandBeaconInfo {
        let params = CurveParams::bn254();
        let pk = encode_g2(&SecretKey::from_seed(seed).unwrap().public_key(&params));
        DrandBeaconInfo {
            public_key: pk.to_hex(),
            period: 3,
            genesis_time: 1727521075,
            genesis_seed: None,
            chain_hash: None,
            scheme: scheme.map(str::to_string),
            beacon_id: None,
        }
    }

    #[test]
    fn parses_info_document() {
        let params = CurveParams::bn254();
        let pk = encode_g2(&SecretKey::from_seed(b"info").unwrap().public_key(&params));
        let json = format!(
            concat!(
                r#"{{"public_key":"{}","period":3,"genesis_time":1727521075,"#,
                r#""genesis_seed":"ab","chain_hash":"cd","#,
                r#""scheme":"bls-bn254-unchained-on-g1","beacon_id":"evmnet"}}"#,
            ),
            pk.to_hex()
        );
        let info: DrandBeaconInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info.beacon_id.as_deref(), Some("evmnet"));

        let beacon = Beacon::from_info(params, &info).unwrap();
        assert_eq!(beacon.period(), 3);
        assert_eq!(beacon.encoded_public_key(), &pk);
        assert_eq!(beacon.hash_to_curve(), &HashToCurve::drand_evmnet());
    }

    #[test]
    fn evmnet_info_verifies_known_round() {
        let info = info_for(b"evmnet", Some("bls-bn254-unchained-on-g1"));
        let beacon = Beacon::from_info(CurveParams::bn254(), &info).unwrap();
        let round = DrandRound {
            round: 1,
            signature: concat!(
                "0a70e20e283df678888bb1300e4ae2a4ae2606cad005761a11aa3761c49104f7",
                "199d398a0aafb794efc14032ed6523bbc93461754e61d5a93d8b11818badf16a",
            )
            .to_string(),
        };
        let signature = round.signature().unwrap();
        assert_eq!(beacon.verify_round(round.round, &signature), Ok(()));
        assert!(beacon.verify_round(2, &signature).is_err());
    }

    #[test]
    fn info_without_scheme_keeps_default_map() {
        let beacon = Beacon::from_info(CurveParams::bn254(), &info_for(b"info", None)).unwrap();
        assert_eq!(beacon.hash_to_curve(), &HashToCurve::TryAndIncrement);
    }

    #[test]
    fn unknown_scheme_is_refused() {
        let info = info_for(b"info", Some("bls-unchained-g1-rfc9380"));
        assert_eq!(
            Beacon::from_info(CurveParams::bn254(), &info),
            Err(BeaconError::UnsupportedScheme("bls-unchained-g1-rfc9380".into()))
        );
    }

    #[test]
    fn info_with_bad_key_is_rejected() {
        let info = DrandBeaconInfo {
            public_key: "00".repeat(128),
            period: 3,
            genesis_time: 1,
            genesis_seed: None,
            chain_hash: None,
            scheme: None,
            beacon_id: None,
        };
        assert!(matches!(
            Beacon::from_info(CurveParams::bn254(), &info),
            Err(BeaconError::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn round_signature_must_be_64_bytes() {
        let round = DrandRound {
            round: 1,
            signature: "aa".repeat(48),
        };
        assert!(matches!(round.signature(), Err(BeaconError::Malformed(_))));
    }
}
