//! Coordinator configuration, loadable from TOML.

use crate::error::CoordinatorError;
use rngate_bls::{EncodedG2, HashToCurve};
use rngate_fees::{CostBasis, FeeEstimator, FeeModel};
use rngate_types::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::path::Path;

const BPS_DENOMINATOR: u128 = 10_000;

/// Global pricing limits, read on every request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Multiplier over the estimated cost, in basis points (10000 = 1x).
    #[serde(default = "default_premium_multiplier_bps")]
    pub premium_multiplier_bps: u64,

    /// Largest callback budget a request may reserve.
    #[serde(default = "default_max_callback_budget")]
    pub max_callback_budget: u64,

    /// How far into the future (seconds) a deadline may be.
    #[serde(default = "default_max_deadline_delta")]
    pub max_deadline_delta: u64,

    /// Ceiling applied to the execution cost basis before estimating.
    #[serde(default = "default_max_cost_basis")]
    pub max_cost_basis: u64,
}

fn default_premium_multiplier_bps() -> u64 {
    2_000
}

fn default_max_callback_budget() -> u64 {
    2_000_000
}

fn default_max_deadline_delta() -> u64 {
    1_800
}

fn default_max_cost_basis() -> u64 {
    5_000_000_000
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            premium_multiplier_bps: default_premium_multiplier_bps(),
            max_callback_budget: default_max_callback_budget(),
            max_deadline_delta: default_max_deadline_delta(),
            max_cost_basis: default_max_cost_basis(),
        }
    }
}

impl PricingConfig {
    /// Price of reserving `callback_budget` units under `basis`:
    /// `estimate(min(basis, cap)) * premium / 10000`.
    ///
    /// Returns the price together with the effective (capped) execution basis.
    pub fn quote(
        &self,
        estimator: &dyn FeeEstimator,
        callback_budget: u64,
        basis: CostBasis,
    ) -> (Amount, u128) {
        let capped = basis.capped(self.max_cost_basis as u128);
        let cost = estimator.estimate_cost(callback_budget, &capped);
        let price = cost.saturating_mul(self.premium_multiplier_bps as u128) / BPS_DENOMINATOR;
        (Amount::new(price), capped.execution)
    }
}

/// Initial beacon key and schedule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconConfig {
    /// G2 public key, hex, in drand wire order.
    pub public_key: EncodedG2,
    pub genesis_time: u64,
    pub period: u64,
    /// How round messages are mapped to G1; try-and-increment when absent.
    #[serde(default)]
    pub hash_to_curve: HashToCurve,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Address of this coordinator deployment.
    #[serde(default)]
    pub address: Address,

    /// Holder of administrative rights.
    #[serde(default)]
    pub owner: Address,

    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub pricing: PricingConfig,

    pub beacon: BeaconConfig,

    #[serde(default)]
    pub fees: FeeModel,
}

fn default_chain_id() -> u64 {
    31_337
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl CoordinatorConfig {
    pub fn new(beacon: BeaconConfig) -> Self {
        Self {
            chain_id: default_chain_id(),
            address: Address::ZERO,
            owner: Address::ZERO,
            log_format: default_log_format(),
            log_level: default_log_level(),
            pricing: PricingConfig::default(),
            beacon,
            fees: FeeModel::default(),
        }
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, CoordinatorError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CoordinatorError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, CoordinatorError> {
        let config: Self = toml::from_str(s).map_err(|e| CoordinatorError::Config(e.to_string()))?;
        config.fees.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, CoordinatorError> {
        toml::to_string_pretty(self).map_err(|e| CoordinatorError::Config(e.to_string()))
    }
}
