//! Authorization of administrative operations.

use rngate_types::Address;

/// Decides whether `caller` may perform administrative operations.
pub trait AccessControl {
    fn is_authorized(&self, caller: &Address) -> bool;
}

/// Single-owner policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OwnerOnly {
    owner: Address,
}

impl OwnerOnly {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }
}

impl AccessControl for OwnerOnly {
    fn is_authorized(&self, caller: &Address) -> bool {
        *caller == self.owner
    }
}
