//! Single-part models.

use crate::basis::CostBasis;
use crate::FeeEstimator;
use serde::{Deserialize, Serialize};

/// `execution * (callback_budget + overhead)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatFee {
    pub overhead: u64,
}

impl FeeEstimator for FlatFee {
    fn estimate_cost(&self, callback_budget: u64, basis: &CostBasis) -> u128 {
        let units = callback_budget as u128 + self.overhead as u128;
        basis.execution.saturating_mul(units)
    }

    fn name(&self) -> &str {
        "flat"
    }
}

/// A constant quote regardless of budget or basis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedPrice {
    pub price: u64,
}

impl FeeEstimator for FixedPrice {
    fn estimate_cost(&self, _callback_budget: u64, _basis: &CostBasis) -> u128 {
        self.price as u128
    }

    fn name(&self) -> &str {
        "fixed"
    }
}
