//! Fee estimation.
//!
//! A [`FeeEstimator`] turns a callback budget (resource units) and the current
//! [`CostBasis`] of the execution environment into a lower-bound cost for
//! running the fulfillment. Estimators apply no margin; the coordinator adds
//! its premium and cap on top.
//!
//! Models:
//! - [`FlatFee`]: one per-unit price for everything.
//! - [`TwoPartFee`]: local execution plus a publication surcharge computed by
//!   one of several [`PublicationFormula`] generations.
//! - [`FixedPrice`]: a constant quote.
//!
//! [`FeeModel`] is the serialisable tagged union of all of them.

pub mod basis;
pub mod error;
pub mod flat;
pub mod model;
pub mod publication;

pub use basis::{CostBasis, CostOracle, PublicationBasis};
pub use error::FeeError;
pub use flat::{FixedPrice, FlatFee};
pub use model::{Environment, FeeModel, DEFAULT_FIXED_PRICE};
pub use publication::{CallFootprint, PublicationFormula, TwoPartFee};

/// Fixed cost (resource units) of a fulfillment call excluding its callback:
/// commitment check, pairing verification, bookkeeping.
pub const FULFILLMENT_OVERHEAD: u64 = 150_000;

/// Strategy for pricing a callback of `callback_budget` units.
pub trait FeeEstimator {
    fn estimate_cost(&self, callback_budget: u64, basis: &CostBasis) -> u128;

    /// Human-readable name of this model.
    fn name(&self) -> &str;
}
