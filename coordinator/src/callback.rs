//! Delivery of randomness to requester-supplied consumers.

use crate::coordinator::RandomnessService;
use crate::error::CallbackError;
use crate::lock::ReentrancyLock;
use rngate_types::{Address, Randomness, RequestId};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// Receives randomness for requests made from its address.
///
/// Implementations pay for their work through [`CallbackContext::charge`].
/// They may call back into the coordinator through
/// [`CallbackContext::service`]; state-mutating calls fail with
/// `Reentrancy` and mark the delivery as failed.
pub trait RandomnessConsumer {
    fn on_randomness(
        &self,
        ctx: &mut CallbackContext<'_>,
        id: RequestId,
        randomness: Randomness,
    ) -> Result<(), CallbackError>;
}

/// Why a delivery was recorded as failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackFailure {
    Reentrancy,
    OutOfBudget,
    Reverted,
}

/// Resource meter for one callback invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Budget {
    limit: u64,
    used: u64,
    exhausted: bool,
}

impl Budget {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            used: 0,
            exhausted: false,
        }
    }

    /// Consume `units`. Overrunning the limit burns the whole budget and
    /// poisons the meter; the delivery is then failed even if the consumer
    /// ignores the error.
    pub fn charge(&mut self, units: u64) -> Result<(), CallbackError> {
        let requested = self.used.saturating_add(units);
        if self.exhausted || requested > self.limit {
            self.used = self.limit;
            self.exhausted = true;
            return Err(CallbackError::OutOfBudget {
                limit: self.limit,
                requested,
            });
        }
        self.used = requested;
        Ok(())
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn remaining(&self) -> u64 {
        self.limit - self.used
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// What a consumer sees during delivery.
pub struct CallbackContext<'a> {
    service: &'a dyn RandomnessService,
    budget: Budget,
}

impl<'a> CallbackContext<'a> {
    pub fn new(service: &'a dyn RandomnessService, limit: u64) -> Self {
        Self {
            service,
            budget: Budget::new(limit),
        }
    }

    pub fn service(&self) -> &'a dyn RandomnessService {
        self.service
    }

    pub fn charge(&mut self, units: u64) -> Result<(), CallbackError> {
        self.budget.charge(units)
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }
}

/// Consumers keyed by the address they request from.
#[derive(Default)]
pub struct ConsumerRegistry {
    consumers: RefCell<HashMap<Address, Rc<dyn RandomnessConsumer>>>,
}

impl ConsumerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, address: Address, consumer: Rc<dyn RandomnessConsumer>) {
        self.consumers.borrow_mut().insert(address, consumer);
    }

    pub fn unregister(&self, address: &Address) -> Option<Rc<dyn RandomnessConsumer>> {
        self.consumers.borrow_mut().remove(address)
    }

    pub fn get(&self, address: &Address) -> Option<Rc<dyn RandomnessConsumer>> {
        self.consumers.borrow().get(address).cloned()
    }
}

/// Result of one delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CallbackOutcome {
    pub failure: Option<(CallbackFailure, String)>,
    pub budget_used: u64,
}

/// Invoke `consumer` with a fresh budget. The consumer runs while the
/// caller holds `lock`; any re-entry attempt it makes is counted against it.
pub(crate) fn dispatch(
    consumer: Option<&dyn RandomnessConsumer>,
    service: &dyn RandomnessService,
    lock: &ReentrancyLock,
    id: RequestId,
    randomness: Randomness,
    limit: u64,
) -> CallbackOutcome {
    // An address without a consumer behaves like an account with no code.
    let Some(consumer) = consumer else {
        return CallbackOutcome {
            failure: None,
            budget_used: 0,
        };
    };

    let rejected_before = lock.rejected_count();
    let mut ctx = CallbackContext::new(service, limit);
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        consumer.on_randomness(&mut ctx, id, randomness)
    }));
    let reentered = lock.rejected_count() > rejected_before;
    let budget = *ctx.budget();

    let failure = match result {
        _ if budget.is_exhausted() => Some((
            CallbackFailure::OutOfBudget,
            CallbackError::OutOfBudget {
                limit,
                requested: limit.saturating_add(1),
            }
            .to_string(),
        )),
        Ok(Err(e)) => Some((e.failure(), e.to_string())),
        Ok(Ok(())) if reentered => Some((
            CallbackFailure::Reentrancy,
            CallbackError::Reentrancy.to_string(),
        )),
        Ok(Ok(())) => None,
        Err(_) => Some((
            CallbackFailure::Reverted,
            CallbackError::Reverted("consumer panicked".into()).to_string(),
        )),
    };

    CallbackOutcome {
        failure,
        budget_used: budget.used(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_charges_up_to_limit() {
        let mut budget = Budget::new(100);
        budget.charge(60).unwrap();
        budget.charge(40).unwrap();
        assert_eq!(budget.remaining(), 0);
        assert!(!budget.is_exhausted());
    }

    #[test]
    fn overrun_burns_everything_and_poisons() {
        let mut budget = Budget::new(100);
        budget.charge(30).unwrap();
        let err = budget.charge(71).unwrap_err();
        assert_eq!(
            err,
            CallbackError::OutOfBudget {
                limit: 100,
                requested: 101
            }
        );
        assert_eq!(budget.used(), 100);
        assert!(budget.is_exhausted());
        assert!(budget.charge(0).is_err());
    }

    #[test]
    fn zero_budget_allows_zero_charges() {
        let mut budget = Budget::new(0);
        assert!(budget.charge(0).is_ok());
        assert!(budget.charge(1).is_err());
    }
}
