//! Serialisable fee model selection.

use crate::basis::CostBasis;
use crate::flat::{FixedPrice, FlatFee};
use crate::publication::{CallFootprint, PublicationFormula, TwoPartFee};
use crate::error::FeeError;
use crate::{FeeEstimator, FULFILLMENT_OVERHEAD};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Any supported fee model, tagged by `model` when serialised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum FeeModel {
    Flat(FlatFee),
    TwoPart(TwoPartFee),
    Fixed(FixedPrice),
}

/// Known execution environments with preset models.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Environment {
    Ethereum,
    OpStackBedrock,
    OpStackEcotone,
    OpStackFjord,
    Scroll,
    /// Deployments that charge a constant price per request.
    FixedFee,
}

impl Environment {
    pub const ALL: [Environment; 6] = [
        Environment::Ethereum,
        Environment::OpStackBedrock,
        Environment::OpStackEcotone,
        Environment::OpStackFjord,
        Environment::Scroll,
        Environment::FixedFee,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Ethereum => "ethereum",
            Environment::OpStackBedrock => "op-stack-bedrock",
            Environment::OpStackEcotone => "op-stack-ecotone",
            Environment::OpStackFjord => "op-stack-fjord",
            Environment::Scroll => "scroll",
            Environment::FixedFee => "fixed-fee",
        }
    }
}

impl FromStr for Environment {
    type Err = FeeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Environment::ALL
            .into_iter()
            .find(|env| env.as_str() == s)
            .ok_or_else(|| FeeError::UnknownEnvironment(s.to_string()))
    }
}

/// Quote used by [`Environment::FixedFee`] until configured otherwise.
pub const DEFAULT_FIXED_PRICE: u64 = 1_000_000_000_000_000;

impl FeeModel {
    pub fn for_environment(env: Environment) -> Self {
        let two_part = |formula| {
            FeeModel::TwoPart(TwoPartFee {
                overhead: FULFILLMENT_OVERHEAD,
                footprint: CallFootprint::FULFILLMENT,
                formula,
            })
        };
        match env {
            Environment::Ethereum => FeeModel::Flat(FlatFee {
                overhead: FULFILLMENT_OVERHEAD,
            }),
            Environment::OpStackBedrock => two_part(PublicationFormula::AdditiveOverhead {
                overhead: 188,
                scalar: 684_000,
                decimals: 6,
            }),
            Environment::OpStackEcotone => two_part(PublicationFormula::Scalars {
                base_fee_scalar: 1368,
                blob_base_fee_scalar: 810_949,
            }),
            Environment::OpStackFjord => two_part(PublicationFormula::Compressed {
                base_fee_scalar: 1368,
                blob_base_fee_scalar: 810_949,
                compression_ratio_bps: 6500,
            }),
            Environment::Scroll => two_part(PublicationFormula::AdditiveOverhead {
                overhead: 2500,
                scalar: 1_150_000_000,
                decimals: 9,
            }),
            Environment::FixedFee => FeeModel::Fixed(FixedPrice {
                price: DEFAULT_FIXED_PRICE,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), FeeError> {
        match self {
            FeeModel::TwoPart(m) => m.formula.validate(),
            FeeModel::Flat(_) | FeeModel::Fixed(_) => Ok(()),
        }
    }
}

impl Default for FeeModel {
    fn default() -> Self {
        Self::for_environment(Environment::Ethereum)
    }
}

impl FeeEstimator for FeeModel {
    fn estimate_cost(&self, callback_budget: u64, basis: &CostBasis) -> u128 {
        match self {
            FeeModel::Flat(m) => m.estimate_cost(callback_budget, basis),
            FeeModel::TwoPart(m) => m.estimate_cost(callback_budget, basis),
            FeeModel::Fixed(m) => m.estimate_cost(callback_budget, basis),
        }
    }

    fn name(&self) -> &str {
        match self {
            FeeModel::Flat(m) => m.name(),
            FeeModel::TwoPart(m) => m.name(),
            FeeModel::Fixed(m) => m.name(),
        }
    }
}
