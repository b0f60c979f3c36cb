//! The request/fulfillment state machine.

use crate::access::{AccessControl, OwnerOnly};
use crate::callback::{self, CallbackFailure, ConsumerRegistry, RandomnessConsumer};
use crate::commitment::{derive_randomness, request_commitment, RequestParams};
use crate::config::{CoordinatorConfig, PricingConfig};
use crate::error::CoordinatorError;
use crate::events::CoordinatorEvent;
use crate::lock::ReentrancyLock;
use rngate_beacon::{round_for, Beacon};
use rngate_bls::{CurveParams, EncodedG1};
use rngate_fees::{CostOracle, FeeEstimator};
use rngate_types::{
    Address, Amount, Clock, Commitment, KeyId, Randomness, RequestId, RequestState, Timestamp,
};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub const TYPE_AND_VERSION: &str = "Rngate 1.0.0";

/// Identity of a coordinator deployment, bound into every commitment and
/// every derived randomness value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Deployment {
    pub chain_id: u64,
    pub address: Address,
}

/// Outcome of an accepted fulfillment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Fulfillment {
    pub id: RequestId,
    pub randomness: Randomness,
    pub state: RequestState,
    pub failure: Option<CallbackFailure>,
    pub budget_used: u64,
}

impl Fulfillment {
    pub fn callback_succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// The coordinator surface visible to consumers during delivery.
pub trait RandomnessService {
    fn request_randomness(
        &self,
        caller: Address,
        deadline: Timestamp,
        callback_budget: u64,
        payment: Amount,
    ) -> Result<RequestId, CoordinatorError>;

    fn fulfill_randomness(
        &self,
        params: &RequestParams,
        signature: &EncodedG1,
    ) -> Result<Fulfillment, CoordinatorError>;

    fn request_price(&self, callback_budget: u64) -> (Amount, u128);

    fn request_state(&self, id: RequestId) -> RequestState;
}

#[derive(Clone, Copy, Debug)]
struct RequestRecord {
    commitment: Commitment,
    state: RequestState,
    failure: Option<CallbackFailure>,
}

struct CoordinatorState {
    next_id: RequestId,
    requests: HashMap<RequestId, RequestRecord>,
    beacons: HashMap<KeyId, Beacon>,
    current_key: KeyId,
    pricing: PricingConfig,
    fee_estimator: Box<dyn FeeEstimator>,
    balance: Amount,
    events: Vec<CoordinatorEvent>,
}

impl CoordinatorState {
    fn current_beacon(&self) -> Result<&Beacon, CoordinatorError> {
        self.beacons
            .get(&self.current_key)
            .ok_or(CoordinatorError::UnknownBeacon(self.current_key))
    }
}

/// Randomness coordinator.
///
/// All entry points take `&self`: state lives behind a `RefCell` and every
/// state-mutating entry point holds the [`ReentrancyLock`] for its whole
/// duration, including consumer delivery. No `RefCell` borrow is held while a
/// consumer runs.
pub struct Coordinator {
    deployment: Deployment,
    clock: Box<dyn Clock>,
    cost_oracle: Box<dyn CostOracle>,
    access: Box<dyn AccessControl>,
    consumers: ConsumerRegistry,
    lock: ReentrancyLock,
    state: RefCell<CoordinatorState>,
}

impl Coordinator {
    pub fn new(
        deployment: Deployment,
        beacon: Beacon,
        pricing: PricingConfig,
        fee_estimator: Box<dyn FeeEstimator>,
        clock: Box<dyn Clock>,
        cost_oracle: Box<dyn CostOracle>,
        access: Box<dyn AccessControl>,
    ) -> Self {
        let key_id = beacon.key_id();
        tracing::info!(
            chain_id = deployment.chain_id,
            address = %deployment.address,
            key_id = %key_id,
            fee_model = fee_estimator.name(),
            "coordinator initialised"
        );
        let mut beacons = HashMap::new();
        beacons.insert(key_id, beacon);
        Self {
            deployment,
            clock,
            cost_oracle,
            access,
            consumers: ConsumerRegistry::new(),
            lock: ReentrancyLock::new(),
            state: RefCell::new(CoordinatorState {
                next_id: RequestId::new(1),
                requests: HashMap::new(),
                beacons,
                current_key: key_id,
                pricing,
                fee_estimator,
                balance: Amount::ZERO,
                events: vec![CoordinatorEvent::BeaconUpdated { key_id }],
            }),
        }
    }

    /// Build a coordinator from configuration, with [`OwnerOnly`] access
    /// control for the configured owner.
    pub fn from_config(
        config: &CoordinatorConfig,
        params: CurveParams,
        clock: Box<dyn Clock>,
        cost_oracle: Box<dyn CostOracle>,
    ) -> Result<Self, CoordinatorError> {
        config.fees.validate()?;
        let beacon = Beacon::new(
            params,
            config.beacon.public_key,
            config.beacon.genesis_time,
            config.beacon.period,
        )?
        .with_hash_to_curve(config.beacon.hash_to_curve.clone());
        Ok(Self::new(
            Deployment {
                chain_id: config.chain_id,
                address: config.address,
            },
            beacon,
            config.pricing,
            Box::new(config.fees),
            clock,
            cost_oracle,
            Box::new(OwnerOnly::new(config.owner)),
        ))
    }

    /// Attach `consumer` as the code living at `address`.
    pub fn register_consumer(&self, address: Address, consumer: Rc<dyn RandomnessConsumer>) {
        self.consumers.register(address, consumer);
    }

    /// Remove the code living at `address`. Later fulfillments for its
    /// requests complete without a callback.
    pub fn unregister_consumer(&self, address: &Address) -> bool {
        self.consumers.unregister(address).is_some()
    }

    // ── Requests ────────────────────────────────────────────────────────

    /// Request randomness for the first beacon round at or after `deadline`.
    ///
    /// `payment` must equal [`Coordinator::request_price`] exactly.
    pub fn request_randomness(
        &self,
        caller: Address,
        deadline: Timestamp,
        callback_budget: u64,
        payment: Amount,
    ) -> Result<RequestId, CoordinatorError> {
        let _guard = self.lock.enter()?;
        let now = self.clock.now();
        let mut state = self.state.borrow_mut();

        let (key_id, round) = {
            let beacon = state.current_beacon()?;
            let earliest = now.saturating_add(beacon.period());
            let latest = now.saturating_add(state.pricing.max_deadline_delta);
            if deadline < earliest || deadline > latest || deadline < beacon.genesis_time() {
                return Err(CoordinatorError::InvalidDeadline(deadline));
            }
            if callback_budget > state.pricing.max_callback_budget {
                return Err(CoordinatorError::OverGasLimit {
                    budget: callback_budget,
                    max: state.pricing.max_callback_budget,
                });
            }
            (beacon.key_id(), beacon.round(deadline)?)
        };

        let (price, effective_cost_basis) = state.pricing.quote(
            state.fee_estimator.as_ref(),
            callback_budget,
            self.cost_oracle.cost_basis(),
        );
        if payment != price {
            return Err(CoordinatorError::IncorrectPayment {
                expected: price,
                provided: payment,
            });
        }

        let id = state.next_id;
        let next = id.next().ok_or(CoordinatorError::RequestIdExhausted)?;
        let params = RequestParams {
            id,
            requester: caller,
            key_id,
            round,
            callback_budget,
        };
        let commitment =
            request_commitment(self.deployment.chain_id, &self.deployment.address, &params);

        state.next_id = next;
        state.requests.insert(
            id,
            RequestRecord {
                commitment,
                state: RequestState::Pending,
                failure: None,
            },
        );
        state.balance = state.balance.saturating_add(payment);
        state.events.push(CoordinatorEvent::RandomnessRequested {
            id,
            requester: caller,
            key_id,
            round,
            callback_budget,
            price,
            effective_cost_basis,
        });

        tracing::info!(
            request_id = %id,
            requester = %caller,
            key_id = %key_id,
            round,
            callback_budget,
            price = %price,
            "randomness requested"
        );
        Ok(id)
    }

    /// Accept the beacon signature for a pending request and deliver the
    /// derived randomness to the requester's consumer.
    ///
    /// Consumer failures do not fail this call; they are recorded on the
    /// request and reported through events.
    pub fn fulfill_randomness(
        &self,
        params: &RequestParams,
        signature: &EncodedG1,
    ) -> Result<Fulfillment, CoordinatorError> {
        let _guard = self.lock.enter()?;
        let Deployment { chain_id, address } = self.deployment;

        {
            let state = self.state.borrow();
            let record = state.requests.get(&params.id);
            let expected = request_commitment(chain_id, &address, params);
            let record = match record {
                Some(r) if r.commitment == expected => r,
                _ => return Err(CoordinatorError::InvalidRequestHash(params.id)),
            };
            if record.state.is_terminal() {
                return Err(CoordinatorError::InvalidRequestState {
                    id: params.id,
                    state: record.state,
                });
            }
            let beacon = state
                .beacons
                .get(&params.key_id)
                .ok_or(CoordinatorError::UnknownBeacon(params.key_id))?;
            beacon.verify_round(params.round, signature)?;
        }

        let randomness =
            derive_randomness(chain_id, &address, params.id, &params.requester, signature);
        let consumer = self.consumers.get(&params.requester);
        let outcome = callback::dispatch(
            consumer.as_deref(),
            self,
            &self.lock,
            params.id,
            randomness,
            params.callback_budget,
        );

        let mut state = self.state.borrow_mut();
        let failure = outcome.failure.as_ref().map(|(f, _)| *f);
        let terminal = match failure {
            None => RequestState::Fulfilled,
            Some(_) => RequestState::Failed,
        };
        if let Some(record) = state.requests.get_mut(&params.id) {
            record.state = terminal;
            record.failure = failure;
        }
        if let Some((reason, error_data)) = outcome.failure {
            tracing::warn!(
                request_id = %params.id,
                requester = %params.requester,
                reason = ?reason,
                error = %error_data,
                budget_used = outcome.budget_used,
                "randomness callback failed"
            );
            state.events.push(CoordinatorEvent::RandomnessCallbackFailed {
                id: params.id,
                failure: reason,
                error_data,
                callback_budget: params.callback_budget,
                budget_used: outcome.budget_used,
            });
        }
        state.events.push(CoordinatorEvent::RandomnessFulfilled {
            id: params.id,
            randomness,
            callback_succeeded: failure.is_none(),
            budget_used: outcome.budget_used,
        });

        tracing::info!(
            request_id = %params.id,
            round = params.round,
            key_id = %params.key_id,
            state = ?terminal,
            "randomness fulfilled"
        );
        Ok(Fulfillment {
            id: params.id,
            randomness,
            state: terminal,
            failure,
            budget_used: outcome.budget_used,
        })
    }

    /// Exact payment a request for `callback_budget` units requires right
    /// now, and the capped execution basis it was priced at.
    pub fn request_price(&self, callback_budget: u64) -> (Amount, u128) {
        let state = self.state.borrow();
        state.pricing.quote(
            state.fee_estimator.as_ref(),
            callback_budget,
            self.cost_oracle.cost_basis(),
        )
    }

    /// `ceil((deadline - genesis) / period)`; `None` before genesis or for a
    /// zero period.
    pub fn round_for(genesis: Timestamp, deadline: Timestamp, period: u64) -> Option<u64> {
        round_for(genesis.as_secs(), deadline.as_secs(), period)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn type_and_version(&self) -> &'static str {
        TYPE_AND_VERSION
    }

    pub fn deployment(&self) -> Deployment {
        self.deployment
    }

    pub fn next_request_id(&self) -> RequestId {
        self.state.borrow().next_id
    }

    pub fn request_state(&self, id: RequestId) -> RequestState {
        self.state
            .borrow()
            .requests
            .get(&id)
            .map(|r| r.state)
            .unwrap_or_default()
    }

    /// Why delivery failed for a `Failed` request.
    pub fn request_failure(&self, id: RequestId) -> Option<CallbackFailure> {
        self.state.borrow().requests.get(&id).and_then(|r| r.failure)
    }

    pub fn commitment(&self, id: RequestId) -> Option<Commitment> {
        self.state.borrow().requests.get(&id).map(|r| r.commitment)
    }

    pub fn current_beacon_key_id(&self) -> KeyId {
        self.state.borrow().current_key
    }

    /// Any beacon ever registered, current or superseded.
    pub fn beacon(&self, key_id: &KeyId) -> Option<Beacon> {
        self.state.borrow().beacons.get(key_id).cloned()
    }

    pub fn pricing(&self) -> PricingConfig {
        self.state.borrow().pricing
    }

    pub fn fee_estimator_name(&self) -> String {
        self.state.borrow().fee_estimator.name().to_string()
    }

    pub fn balance(&self) -> Amount {
        self.state.borrow().balance
    }

    /// Take all events emitted since the last call.
    pub fn drain_events(&self) -> Vec<CoordinatorEvent> {
        std::mem::take(&mut self.state.borrow_mut().events)
    }

    // ── Administration ──────────────────────────────────────────────────

    /// Make `beacon` the key new requests are committed against. Previously
    /// registered keys stay available for their pending requests.
    pub fn set_beacon(&self, caller: &Address, beacon: Beacon) -> Result<(), CoordinatorError> {
        let _guard = self.admin_entry(caller)?;
        let mut state = self.state.borrow_mut();
        let key_id = beacon.key_id();
        if let Some(existing) = state.beacons.get(&key_id) {
            if *existing != beacon {
                return Err(CoordinatorError::InvalidBeacon(format!(
                    "key {key_id} is already registered with a different schedule or map"
                )));
            }
        }
        let previous = state.current_key;
        state.beacons.entry(key_id).or_insert(beacon);
        state.current_key = key_id;
        state.events.push(CoordinatorEvent::BeaconUpdated { key_id });
        tracing::info!(key_id = %key_id, previous = %previous, "beacon updated");
        Ok(())
    }

    pub fn set_premium_multiplier_bps(
        &self,
        caller: &Address,
        bps: u64,
    ) -> Result<(), CoordinatorError> {
        self.update_pricing(
            caller,
            |p| p.premium_multiplier_bps = bps,
            CoordinatorEvent::PremiumMultiplierUpdated { bps },
        )
    }

    pub fn set_max_callback_budget(
        &self,
        caller: &Address,
        budget: u64,
    ) -> Result<(), CoordinatorError> {
        self.update_pricing(
            caller,
            |p| p.max_callback_budget = budget,
            CoordinatorEvent::MaxCallbackBudgetUpdated { budget },
        )
    }

    pub fn set_max_deadline_delta(
        &self,
        caller: &Address,
        delta: u64,
    ) -> Result<(), CoordinatorError> {
        self.update_pricing(
            caller,
            |p| p.max_deadline_delta = delta,
            CoordinatorEvent::MaxDeadlineDeltaUpdated { delta },
        )
    }

    /// Ceiling on the execution cost basis used for quotes.
    pub fn set_cost_basis_cap(&self, caller: &Address, cap: u64) -> Result<(), CoordinatorError> {
        self.update_pricing(
            caller,
            |p| p.max_cost_basis = cap,
            CoordinatorEvent::CostBasisCapUpdated { cap },
        )
    }

    pub fn set_fee_estimator(
        &self,
        caller: &Address,
        estimator: Box<dyn FeeEstimator>,
    ) -> Result<(), CoordinatorError> {
        let _guard = self.admin_entry(caller)?;
        let name = estimator.name().to_string();
        let mut state = self.state.borrow_mut();
        state.fee_estimator = estimator;
        tracing::info!(fee_model = %name, "fee estimator updated");
        state.events.push(CoordinatorEvent::FeeEstimatorUpdated { name });
        Ok(())
    }

    /// Withdraw collected payments to `recipient`. An `amount` of zero
    /// withdraws the whole balance.
    pub fn withdraw(
        &self,
        caller: &Address,
        recipient: Address,
        amount: Amount,
    ) -> Result<Amount, CoordinatorError> {
        let _guard = self.admin_entry(caller)?;
        let mut state = self.state.borrow_mut();
        let available = state.balance;
        let amount = if amount.is_zero() { available } else { amount };
        state.balance = available
            .checked_sub(amount)
            .ok_or(CoordinatorError::InsufficientBalance {
                requested: amount,
                available,
            })?;
        state.events.push(CoordinatorEvent::Withdrawn { recipient, amount });
        tracing::info!(recipient = %recipient, amount = %amount, "balance withdrawn");
        Ok(amount)
    }

    fn admin_entry(
        &self,
        caller: &Address,
    ) -> Result<crate::lock::LockGuard<'_>, CoordinatorError> {
        let guard = self.lock.enter()?;
        if !self.access.is_authorized(caller) {
            tracing::debug!(caller = %caller, "unauthorized admin call");
            return Err(CoordinatorError::Unauthorized(*caller));
        }
        Ok(guard)
    }

    fn update_pricing(
        &self,
        caller: &Address,
        apply: impl FnOnce(&mut PricingConfig),
        event: CoordinatorEvent,
    ) -> Result<(), CoordinatorError> {
        let _guard = self.admin_entry(caller)?;
        let mut state = self.state.borrow_mut();
        apply(&mut state.pricing);
        tracing::info!(?event, "pricing updated");
        state.events.push(event);
        Ok(())
    }
}

impl RandomnessService for Coordinator {
    fn request_randomness(
        &self,
        caller: Address,
        deadline: Timestamp,
        callback_budget: u64,
        payment: Amount,
    ) -> Result<RequestId, CoordinatorError> {
        Coordinator::request_randomness(self, caller, deadline, callback_budget, payment)
    }

    fn fulfill_randomness(
        &self,
        params: &RequestParams,
        signature: &EncodedG1,
    ) -> Result<Fulfillment, CoordinatorError> {
        Coordinator::fulfill_randomness(self, params, signature)
    }

    fn request_price(&self, callback_budget: u64) -> (Amount, u128) {
        Coordinator::request_price(self, callback_budget)
    }

    fn request_state(&self, id: RequestId) -> RequestState {
        Coordinator::request_state(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rngate_bls::{encode_g1, encode_g2, SecretKey};
    use rngate_fees::{CostBasis, FlatFee};
    use rngate_types::SystemClock;
    use std::cell::Cell;

    const GENESIS: u64 = 1_000_000;
    const PERIOD: u64 = 3;

    struct FixedClock(Cell<u64>);

    impl Clock for FixedClock {
        fn now(&self) -> Timestamp {
            Timestamp::new(self.0.get())
        }
    }

    struct FixedOracle(u128);

    impl CostOracle for FixedOracle {
        fn cost_basis(&self) -> CostBasis {
            CostBasis::flat(self.0)
        }
    }

    fn owner() -> Address {
        Address::from_low_u64(0x0a)
    }

    fn setup() -> (Coordinator, SecretKey) {
        let params = CurveParams::bn254();
        let sk = SecretKey::from_seed(b"coordinator unit").unwrap();
        let key = encode_g2(&sk.public_key(&params));
        let beacon = Beacon::new(params, key, GENESIS, PERIOD).unwrap();
        let coordinator = Coordinator::new(
            Deployment {
                chain_id: 1,
                address: Address::from_low_u64(0xc0),
            },
            beacon,
            PricingConfig::default(),
            Box::new(FlatFee { overhead: 0 }),
            Box::new(FixedClock(Cell::new(GENESIS + 100))),
            Box::new(FixedOracle(10)),
            Box::new(OwnerOnly::new(owner())),
        );
        (coordinator, sk)
    }

    #[test]
    fn construction_emits_initial_beacon() {
        let (c, _) = setup();
        let events = c.drain_events();
        assert_eq!(
            events,
            vec![CoordinatorEvent::BeaconUpdated {
                key_id: c.current_beacon_key_id()
            }]
        );
        assert!(c.drain_events().is_empty());
        assert_eq!(c.next_request_id(), RequestId::new(1));
        assert_eq!(c.type_and_version(), "Rngate 1.0.0");
    }

    #[test]
    fn request_then_fulfill_without_consumer() {
        let (c, sk) = setup();
        let requester = Address::from_low_u64(0xbeef);
        let deadline = Timestamp::new(GENESIS + 130);
        let (price, _) = c.request_price(10_000);
        let id = c.request_randomness(requester, deadline, 10_000, price).unwrap();
        assert_eq!(c.request_state(id), RequestState::Pending);
        assert_eq!(c.balance(), price);

        let round = Coordinator::round_for(Timestamp::new(GENESIS), deadline, PERIOD).unwrap();
        let params = RequestParams {
            id,
            requester,
            key_id: c.current_beacon_key_id(),
            round,
            callback_budget: 10_000,
        };
        let beacon = c.beacon(&params.key_id).unwrap();
        let message = rngate_beacon::round_message(round);
        let sig = sk.sign(&CurveParams::bn254(), beacon.hash_to_curve(), &message).unwrap();
        let sig = encode_g1(&sig);
        let done = c.fulfill_randomness(&params, &sig).unwrap();
        assert_eq!(done.state, RequestState::Fulfilled);
        assert!(done.callback_succeeded());
        assert_eq!(done.budget_used, 0);
        assert_eq!(c.request_state(id), RequestState::Fulfilled);
        assert!(!c.lock.is_held());
    }

    #[test]
    fn unknown_request_is_hash_mismatch() {
        let (c, _) = setup();
        let params = RequestParams {
            id: RequestId::new(42),
            requester: Address::from_low_u64(1),
            key_id: c.current_beacon_key_id(),
            round: 1,
            callback_budget: 0,
        };
        let sig = EncodedG1::from_words([0u8; 32], [0u8; 32]);
        assert_eq!(
            c.fulfill_randomness(&params, &sig).unwrap_err(),
            CoordinatorError::InvalidRequestHash(RequestId::new(42))
        );
    }

    #[test]
    fn admin_requires_owner() {
        let (c, _) = setup();
        let rando = Address::from_low_u64(0x0b);
        assert_eq!(
            c.set_premium_multiplier_bps(&rando, 1).unwrap_err(),
            CoordinatorError::Unauthorized(rando)
        );
        c.set_premium_multiplier_bps(&owner(), 12_000).unwrap();
        assert_eq!(c.pricing().premium_multiplier_bps, 12_000);
        assert!(!c.lock.is_held());
    }

    #[test]
    fn system_clock_is_usable() {
        let params = CurveParams::bn254();
        let sk = SecretKey::from_seed(b"system clock").unwrap();
        let beacon = Beacon::new(params, encode_g2(&sk.public_key(&params)), 1, 1).unwrap();
        let c = Coordinator::new(
            Deployment {
                chain_id: 1,
                address: Address::ZERO,
            },
            beacon,
            PricingConfig::default(),
            Box::new(FlatFee { overhead: 0 }),
            Box::new(SystemClock),
            Box::new(FixedOracle(0)),
            Box::new(OwnerOnly::new(owner())),
        );
        let (price, _) = c.request_price(1);
        assert!(price.is_zero());
    }
}
