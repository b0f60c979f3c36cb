//! Shared fixtures for coordinator integration tests.

#![allow(dead_code)]

use rngate_beacon::{round_message, Beacon};
use rngate_bls::{encode_g1, encode_g2, CurveParams, EncodedG1, HashToCurve, SecretKey};
use rngate_coordinator::{
    CallbackContext, CallbackError, Coordinator, Deployment, OwnerOnly, PricingConfig,
    RandomnessConsumer, RequestParams,
};
use rngate_fees::{Environment, FeeModel};
use rngate_nullables::{NullClock, NullCostOracle};
use rngate_types::{Address, Randomness, RequestId, Timestamp};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const GENESIS: u64 = 1_727_521_075;
pub const PERIOD: u64 = 3;
pub const CHAIN_ID: u64 = 31_337;
pub const GWEI: u128 = 1_000_000_000;
pub const START: u64 = GENESIS + 1_000;

pub fn coordinator_address() -> Address {
    Address::from_low_u64(0xc0de)
}

pub fn owner() -> Address {
    Address::from_low_u64(0x0123)
}

pub fn requester() -> Address {
    Address::from_low_u64(0xbeef)
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub coordinator: Coordinator,
    pub clock: NullClock,
    pub oracle: NullCostOracle,
    pub params: CurveParams,
    pub beacon_key: SecretKey,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_pricing(PricingConfig::default())
    }

    pub fn with_pricing(pricing: PricingConfig) -> Self {
        let params = CurveParams::bn254();
        let beacon_key = SecretKey::from_seed(b"harness beacon").expect("seed");
        let clock = NullClock::new(START);
        let oracle = NullCostOracle::flat(GWEI);
        let coordinator = Coordinator::new(
            Deployment {
                chain_id: CHAIN_ID,
                address: coordinator_address(),
            },
            beacon_for(&params, &beacon_key, GENESIS, PERIOD),
            pricing,
            Box::new(FeeModel::for_environment(Environment::Ethereum)),
            Box::new(clock.clone()),
            Box::new(oracle.clone()),
            Box::new(OwnerOnly::new(owner())),
        );
        coordinator.drain_events();
        Self {
            coordinator,
            clock,
            oracle,
            params,
            beacon_key,
        }
    }

    pub fn deadline(&self, offset: u64) -> Timestamp {
        Timestamp::new(START + offset)
    }

    /// Place a correctly paid request `offset` seconds ahead.
    pub fn request(&self, from: Address, offset: u64, callback_budget: u64) -> RequestParams {
        let deadline = self.deadline(offset);
        let (price, _) = self.coordinator.request_price(callback_budget);
        let id = self
            .coordinator
            .request_randomness(from, deadline, callback_budget, price)
            .expect("request accepted");
        let beacon = self
            .coordinator
            .beacon(&self.coordinator.current_beacon_key_id())
            .expect("current beacon");
        RequestParams {
            id,
            requester: from,
            key_id: beacon.key_id(),
            round: beacon.round(deadline).expect("round"),
            callback_budget,
        }
    }

    pub fn sign(&self, round: u64) -> EncodedG1 {
        sign_round(&self.params, &self.beacon_key, round)
    }
}

pub fn beacon_for(params: &CurveParams, key: &SecretKey, genesis: u64, period: u64) -> Beacon {
    Beacon::new(*params, encode_g2(&key.public_key(params)), genesis, period).expect("valid beacon")
}

pub fn sign_round(params: &CurveParams, key: &SecretKey, round: u64) -> EncodedG1 {
    sign_round_with(params, &HashToCurve::default(), key, round)
}

pub fn sign_round_with(
    params: &CurveParams,
    map: &HashToCurve,
    key: &SecretKey,
    round: u64,
) -> EncodedG1 {
    encode_g1(&key.sign(params, map, &round_message(round)).expect("sign"))
}

// ---------------------------------------------------------------------------
// Consumers
// ---------------------------------------------------------------------------

/// Records every delivery and charges a fixed cost.
#[derive(Default)]
pub struct RecordingConsumer {
    pub cost: u64,
    pub received: RefCell<Vec<(RequestId, Randomness)>>,
}

impl RecordingConsumer {
    pub fn with_cost(cost: u64) -> Rc<Self> {
        Rc::new(Self {
            cost,
            received: RefCell::new(Vec::new()),
        })
    }
}

impl RandomnessConsumer for RecordingConsumer {
    fn on_randomness(
        &self,
        ctx: &mut CallbackContext<'_>,
        id: RequestId,
        randomness: Randomness,
    ) -> Result<(), CallbackError> {
        ctx.charge(self.cost)?;
        self.received.borrow_mut().push((id, randomness));
        Ok(())
    }
}

/// Always fails.
pub struct RevertingConsumer;

impl RandomnessConsumer for RevertingConsumer {
    fn on_randomness(
        &self,
        ctx: &mut CallbackContext<'_>,
        _id: RequestId,
        _randomness: Randomness,
    ) -> Result<(), CallbackError> {
        ctx.charge(21_000)?;
        Err(CallbackError::Reverted("always erroring".into()))
    }
}

/// Tries to spend more than it was given.
pub struct GreedyConsumer {
    pub swallow: bool,
}

impl RandomnessConsumer for GreedyConsumer {
    fn on_randomness(
        &self,
        ctx: &mut CallbackContext<'_>,
        _id: RequestId,
        _randomness: Randomness,
    ) -> Result<(), CallbackError> {
        let over = ctx.budget().limit() + 1;
        match ctx.charge(over) {
            Err(_) if self.swallow => Ok(()),
            other => other,
        }
    }
}

pub struct PanickingConsumer;

impl RandomnessConsumer for PanickingConsumer {
    fn on_randomness(
        &self,
        _ctx: &mut CallbackContext<'_>,
        _id: RequestId,
        _randomness: Randomness,
    ) -> Result<(), CallbackError> {
        panic!("consumer bug");
    }
}

/// What a re-entrant consumer attempts during delivery.
pub enum Reentry {
    Request { payment: u128 },
    Fulfill { params: RequestParams, signature: EncodedG1 },
}

/// Calls back into the coordinator from its callback.
pub struct ReentrantConsumer {
    pub address: Address,
    pub attempt: Reentry,
    pub swallow: bool,
    pub attempts: Cell<u32>,
}

impl ReentrantConsumer {
    pub fn new(address: Address, attempt: Reentry, swallow: bool) -> Rc<Self> {
        Rc::new(Self {
            address,
            attempt,
            swallow,
            attempts: Cell::new(0),
        })
    }
}

impl RandomnessConsumer for ReentrantConsumer {
    fn on_randomness(
        &self,
        ctx: &mut CallbackContext<'_>,
        _id: RequestId,
        _randomness: Randomness,
    ) -> Result<(), CallbackError> {
        self.attempts.set(self.attempts.get() + 1);
        let service = ctx.service();
        let result = match &self.attempt {
            Reentry::Request { payment } => service
                .request_randomness(
                    self.address,
                    Timestamp::new(START + 60),
                    10_000,
                    (*payment).into(),
                )
                .map(|_| ()),
            Reentry::Fulfill { params, signature } => {
                service.fulfill_randomness(params, signature).map(|_| ())
            }
        };
        match result {
            Err(_) if self.swallow => Ok(()),
            other => other.map_err(CallbackError::from),
        }
    }
}
