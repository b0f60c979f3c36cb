use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BlsError {
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("field element is not reduced modulo p")]
    NonCanonicalFieldElement,

    #[error("point is not on the curve")]
    NotOnCurve,

    #[error("point is not in the prime-order subgroup")]
    NotInSubgroup,

    #[error("point at infinity is not allowed")]
    IdentityPoint,

    #[error("no curve point found after {0} attempts")]
    HashToCurveExhausted(u32),

    #[error("cannot expand a message to {0} bytes")]
    InvalidExpandLength(usize),

    #[error("invalid domain separation tag: {0}")]
    InvalidDst(String),

    #[error("signature does not match message and public key")]
    SignatureMismatch,

    #[error("secret key reduces to zero")]
    ZeroSecretKey,
}
