//! Two-part fees: local execution plus a data-publication surcharge.
//!
//! The surcharge tracks the size of the fulfillment transaction as published
//! to the settlement layer. Three formula generations are supported; they
//! differ in how they weigh bytes and which base fees they read.

use crate::basis::{CostBasis, PublicationBasis};
use crate::error::FeeError;
use crate::FeeEstimator;
use serde::{Deserialize, Serialize};

/// Byte profile of the raw signed fulfillment transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallFootprint {
    pub zero_bytes: u64,
    pub non_zero_bytes: u64,
}

impl CallFootprint {
    /// Selector plus seven words of arguments, wrapped in a signed envelope.
    pub const FULFILLMENT: CallFootprint = CallFootprint {
        zero_bytes: 101,
        non_zero_bytes: 237,
    };

    pub const fn len(&self) -> u64 {
        self.zero_bytes + self.non_zero_bytes
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calldata units: 4 per zero byte, 16 per non-zero byte.
    pub const fn data_units(&self) -> u64 {
        self.zero_bytes * 4 + self.non_zero_bytes * 16
    }
}

impl Default for CallFootprint {
    fn default() -> Self {
        Self::FULFILLMENT
    }
}

const SCALAR_PRECISION: u128 = 1_000_000;
const MAX_DECIMALS: u32 = 38;
const MIN_TRANSACTION_SIZE: i128 = 100;
const SIZE_INTERCEPT: i128 = -42_585_600;
const SIZE_COEFFICIENT: i128 = 836_500;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "generation", rename_all = "snake_case")]
pub enum PublicationFormula {
    /// `(data_units + overhead) * base_fee * scalar / 10^decimals`.
    AdditiveOverhead {
        overhead: u64,
        scalar: u64,
        decimals: u32,
    },
    /// Blob-aware scalars:
    /// `data_units * (16 * base_fee_scalar * base_fee
    ///   + blob_base_fee_scalar * blob_base_fee) / 16e6`.
    Scalars {
        base_fee_scalar: u64,
        blob_base_fee_scalar: u64,
    },
    /// Scalars applied to an estimated compressed size rather than raw
    /// data units. `compression_ratio_bps` is compressed/raw in basis points.
    Compressed {
        base_fee_scalar: u64,
        blob_base_fee_scalar: u64,
        compression_ratio_bps: u64,
    },
}

impl PublicationFormula {
    pub fn validate(&self) -> Result<(), FeeError> {
        match *self {
            PublicationFormula::AdditiveOverhead { decimals, .. } if decimals > MAX_DECIMALS => {
                Err(FeeError::InvalidDecimals(decimals))
            }
            PublicationFormula::Compressed {
                compression_ratio_bps,
                ..
            } if compression_ratio_bps > 10_000 => {
                Err(FeeError::InvalidCompressionRatio(compression_ratio_bps))
            }
            _ => Ok(()),
        }
    }

    pub fn publication_cost(&self, footprint: &CallFootprint, basis: &PublicationBasis) -> u128 {
        match *self {
            PublicationFormula::AdditiveOverhead {
                overhead,
                scalar,
                decimals,
            } => {
                let units = footprint.data_units() as u128 + overhead as u128;
                let scaled = units
                    .saturating_mul(basis.base_fee)
                    .saturating_mul(scalar as u128);
                match 10u128.checked_pow(decimals) {
                    Some(divisor) => scaled / divisor,
                    None => 0,
                }
            }
            PublicationFormula::Scalars {
                base_fee_scalar,
                blob_base_fee_scalar,
            } => {
                let weighted = weighted_base_fee(base_fee_scalar, blob_base_fee_scalar, basis);
                (footprint.data_units() as u128).saturating_mul(weighted) / (16 * SCALAR_PRECISION)
            }
            PublicationFormula::Compressed {
                base_fee_scalar,
                blob_base_fee_scalar,
                compression_ratio_bps,
            } => {
                let weighted = weighted_base_fee(base_fee_scalar, blob_base_fee_scalar, basis);
                let compressed = footprint.len() as i128 * compression_ratio_bps as i128 / 10_000;
                let estimated = (SIZE_INTERCEPT + SIZE_COEFFICIENT * compressed)
                    .max(MIN_TRANSACTION_SIZE * SCALAR_PRECISION as i128);
                (estimated as u128).saturating_mul(weighted) / (SCALAR_PRECISION * SCALAR_PRECISION)
            }
        }
    }
}

fn weighted_base_fee(
    base_fee_scalar: u64,
    blob_base_fee_scalar: u64,
    basis: &PublicationBasis,
) -> u128 {
    let base = (base_fee_scalar as u128)
        .saturating_mul(16)
        .saturating_mul(basis.base_fee);
    let blob = (blob_base_fee_scalar as u128).saturating_mul(basis.blob_base_fee);
    base.saturating_add(blob)
}

/// `execution * (callback_budget + overhead) + publication surcharge`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoPartFee {
    pub overhead: u64,
    #[serde(default)]
    pub footprint: CallFootprint,
    pub formula: PublicationFormula,
}

impl FeeEstimator for TwoPartFee {
    fn estimate_cost(&self, callback_budget: u64, basis: &CostBasis) -> u128 {
        let units = callback_budget as u128 + self.overhead as u128;
        let local = basis.execution.saturating_mul(units);
        local.saturating_add(
            self.formula
                .publication_cost(&self.footprint, &basis.publication),
        )
    }

    fn name(&self) -> &str {
        match self.formula {
            PublicationFormula::AdditiveOverhead { .. } => "two-part/additive-overhead",
            PublicationFormula::Scalars { .. } => "two-part/scalars",
            PublicationFormula::Compressed { .. } => "two-part/compressed",
        }
    }
}
