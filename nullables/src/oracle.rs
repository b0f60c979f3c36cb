//! Nullable execution-cost oracle.

use rngate_fees::{CostBasis, CostOracle, PublicationBasis};
use std::cell::Cell;
use std::rc::Rc;

/// A cost oracle whose basis is set by the test. Clones share the basis.
#[derive(Clone, Debug, Default)]
pub struct NullCostOracle {
    basis: Rc<Cell<CostBasis>>,
}

impl NullCostOracle {
    pub fn new(basis: CostBasis) -> Self {
        Self {
            basis: Rc::new(Cell::new(basis)),
        }
    }

    pub fn flat(execution: u128) -> Self {
        Self::new(CostBasis::flat(execution))
    }

    pub fn set(&self, basis: CostBasis) {
        self.basis.set(basis);
    }

    pub fn set_execution(&self, execution: u128) {
        let basis = self.basis.get();
        self.basis.set(CostBasis { execution, ..basis });
    }

    pub fn set_publication(&self, publication: PublicationBasis) {
        let basis = self.basis.get();
        self.basis.set(CostBasis { publication, ..basis });
    }

    /// Multiply the execution basis by `factor`, simulating a fee-market spike.
    pub fn spike(&self, factor: u128) {
        let basis = self.basis.get();
        self.set_execution(basis.execution.saturating_mul(factor));
    }
}

impl CostOracle for NullCostOracle {
    fn cost_basis(&self) -> CostBasis {
        self.basis.get()
    }
}
