use rngate_types::Timestamp;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BeaconError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid beacon configuration: genesis {genesis_time}, period {period}")]
    InvalidBeaconConfiguration { genesis_time: u64, period: u64 },

    #[error("deadline {deadline} is before beacon genesis {genesis}")]
    InvalidDeadline { deadline: Timestamp, genesis: Timestamp },

    #[error("invalid signature")]
    InvalidSignature,

    #[error("unsupported beacon scheme: {0}")]
    UnsupportedScheme(String),

    #[error("malformed beacon data: {0}")]
    Malformed(String),
}
