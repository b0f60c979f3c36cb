use crate::callback::CallbackFailure;
use rngate_beacon::BeaconError;
use rngate_fees::FeeError;
use rngate_types::{Address, Amount, KeyId, RequestId, RequestState, Timestamp};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("invalid deadline {0}")]
    InvalidDeadline(Timestamp),

    #[error("callback budget {budget} exceeds maximum {max}")]
    OverGasLimit { budget: u64, max: u64 },

    #[error("incorrect payment: expected {expected}, provided {provided}")]
    IncorrectPayment { expected: Amount, provided: Amount },

    #[error("request hash mismatch for request {0}")]
    InvalidRequestHash(RequestId),

    #[error("request {id} is {state:?}, expected Pending")]
    InvalidRequestState { id: RequestId, state: RequestState },

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid beacon configuration: genesis {genesis_time}, period {period}")]
    InvalidBeaconConfiguration { genesis_time: u64, period: u64 },

    #[error("invalid beacon: {0}")]
    InvalidBeacon(String),

    #[error("no beacon registered for key {0}")]
    UnknownBeacon(KeyId),

    #[error("re-entrant call rejected")]
    Reentrancy,

    #[error("{0} is not authorized")]
    Unauthorized(Address),

    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Amount, available: Amount },

    #[error("request id space exhausted")]
    RequestIdExhausted,

    #[error("invalid fee model: {0}")]
    InvalidFeeModel(#[from] FeeError),

    #[error("config error: {0}")]
    Config(String),
}

impl From<BeaconError> for CoordinatorError {
    fn from(e: BeaconError) -> Self {
        match e {
            BeaconError::InvalidPublicKey(reason) => CoordinatorError::InvalidPublicKey(reason),
            BeaconError::InvalidBeaconConfiguration {
                genesis_time,
                period,
            } => CoordinatorError::InvalidBeaconConfiguration {
                genesis_time,
                period,
            },
            BeaconError::InvalidDeadline { deadline, .. } => {
                CoordinatorError::InvalidDeadline(deadline)
            }
            BeaconError::InvalidSignature => CoordinatorError::InvalidSignature,
            BeaconError::UnsupportedScheme(scheme) => {
                CoordinatorError::InvalidBeacon(format!("unsupported scheme {scheme}"))
            }
            BeaconError::Malformed(reason) => CoordinatorError::InvalidBeacon(reason),
        }
    }
}

/// Failure raised by a consumer while handling delivered randomness.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallbackError {
    #[error("callback budget exhausted: limit {limit}, requested {requested}")]
    OutOfBudget { limit: u64, requested: u64 },

    #[error("re-entrant call rejected")]
    Reentrancy,

    #[error("callback reverted: {0}")]
    Reverted(String),
}

impl CallbackError {
    pub fn failure(&self) -> CallbackFailure {
        match self {
            CallbackError::OutOfBudget { .. } => CallbackFailure::OutOfBudget,
            CallbackError::Reentrancy => CallbackFailure::Reentrancy,
            CallbackError::Reverted(_) => CallbackFailure::Reverted,
        }
    }
}

impl From<CoordinatorError> for CallbackError {
    fn from(e: CoordinatorError) -> Self {
        match e {
            CoordinatorError::Reentrancy => CallbackError::Reentrancy,
            other => CallbackError::Reverted(other.to_string()),
        }
    }
}
