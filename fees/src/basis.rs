//! Cost bases reported by the execution-cost oracle.

use serde::{Deserialize, Serialize};

/// Price inputs for one quote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBasis {
    /// Price of one local execution unit.
    pub execution: u128,
    /// Inputs for the data-publication surcharge of two-part environments.
    /// Ignored by single-part models.
    #[serde(default)]
    pub publication: PublicationBasis,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationBasis {
    /// Base fee of the settlement layer's calldata.
    pub base_fee: u128,
    /// Base fee of blob space, used by blob-aware formula generations.
    #[serde(default)]
    pub blob_base_fee: u128,
}

impl CostBasis {
    pub fn flat(execution: u128) -> Self {
        Self {
            execution,
            publication: PublicationBasis::default(),
        }
    }

    /// Same basis with the execution price clamped to `cap`.
    pub fn capped(self, cap: u128) -> Self {
        Self {
            execution: self.execution.min(cap),
            ..self
        }
    }
}

/// Execution-cost oracle of the host environment, queried at request time.
pub trait CostOracle {
    fn cost_basis(&self) -> CostBasis;
}
