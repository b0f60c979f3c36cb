use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeeError {
    #[error("compression ratio {0} bps exceeds 10000")]
    InvalidCompressionRatio(u64),

    #[error("scalar decimals {0} exceed 38")]
    InvalidDecimals(u32),

    #[error("unknown environment {0:?}")]
    UnknownEnvironment(String),
}
