//! Events emitted by the coordinator. Since only commitments are stored,
//! `RandomnessRequested` is the durable record of a request's plaintext.

use crate::callback::CallbackFailure;
use rngate_types::{Address, Amount, KeyId, Randomness, RequestId};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CoordinatorEvent {
    RandomnessRequested {
        id: RequestId,
        requester: Address,
        key_id: KeyId,
        round: u64,
        callback_budget: u64,
        price: Amount,
        effective_cost_basis: u128,
    },
    RandomnessFulfilled {
        id: RequestId,
        randomness: Randomness,
        callback_succeeded: bool,
        budget_used: u64,
    },
    RandomnessCallbackFailed {
        id: RequestId,
        failure: CallbackFailure,
        error_data: String,
        callback_budget: u64,
        budget_used: u64,
    },
    BeaconUpdated {
        key_id: KeyId,
    },
    PremiumMultiplierUpdated {
        bps: u64,
    },
    MaxCallbackBudgetUpdated {
        budget: u64,
    },
    MaxDeadlineDeltaUpdated {
        delta: u64,
    },
    CostBasisCapUpdated {
        cap: u64,
    },
    FeeEstimatorUpdated {
        name: String,
    },
    Withdrawn {
        recipient: Address,
        amount: Amount,
    },
}
