//! Nullable infrastructure for deterministic testing.
//!
//! The coordinator reaches the outside world only through the `Clock` and
//! `CostOracle` traits. This crate provides stand-ins that:
//! - Return deterministic values
//! - Can be controlled programmatically after being handed to the coordinator
//!   (clones share state)
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod oracle;

pub use clock::NullClock;
pub use oracle::NullCostOracle;
