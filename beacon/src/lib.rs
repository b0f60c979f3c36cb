//! Beacon registry entries.
//!
//! A [`Beacon`] binds one BN254 public key to the schedule of the external
//! randomness beacon that holds it (`genesis_time`, `period`). It answers two
//! questions: which round satisfies a deadline, and whether a
//! `(round, signature)` pair was produced by this key.
//!
//! Several beacons may coexist; they are identified by [`Beacon::key_id`].

pub mod beacon;
pub mod drand;
pub mod error;

pub use beacon::{key_id_of, round_for, round_message, Beacon, SCHEME_BN254_UNCHAINED_ON_G1};
pub use drand::{DrandBeaconInfo, DrandRound};
pub use error::BeaconError;
