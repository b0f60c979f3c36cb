//! Request identifiers and lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonically increasing request identifier, never reused.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct RequestId(u64);

impl RequestId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a randomness request.
///
/// `Nonexistent -> Pending -> {Fulfilled | Failed}`; both outcomes are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RequestState {
    #[default]
    Nonexistent,
    Pending,
    Fulfilled,
    Failed,
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Fulfilled | Self::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_outcomes_are_terminal() {
        assert!(!RequestState::Nonexistent.is_terminal());
        assert!(!RequestState::Pending.is_terminal());
        assert!(RequestState::Fulfilled.is_terminal());
        assert!(RequestState::Failed.is_terminal());
    }

    #[test]
    fn ids_step_until_exhausted() {
        assert_eq!(RequestId::new(4).next(), Some(RequestId::new(5)));
        assert_eq!(RequestId::new(u64::MAX).next(), None);
    }
}
