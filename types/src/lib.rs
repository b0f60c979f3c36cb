//! Fundamental types for the rngate randomness oracle.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! addresses, 32-byte digests, amounts, timestamps and request identifiers, plus
//! the Keccak-256 word encoding that request commitments are built from.

pub mod address;
pub mod amount;
pub mod error;
pub mod hash;
pub mod request;
pub mod time;

pub use address::Address;
pub use amount::Amount;
pub use error::TypesError;
pub use hash::{keccak256, keccak256_multi, WordEncoder, H256};
pub use request::{RequestId, RequestState};
pub use time::{Clock, SystemClock, Timestamp};

/// Identifier of a beacon public key (Keccak-256 of its native encoding).
pub type KeyId = H256;

/// Hash of a request's full parameter tuple.
pub type Commitment = H256;

/// Final randomness delivered to a requester.
pub type Randomness = H256;
