//! Administrative operations and balance withdrawal.

mod common;

use common::*;
use rngate_bls::SecretKey;
use rngate_coordinator::{CoordinatorError, CoordinatorEvent};
use rngate_fees::{Environment, FeeModel};
use rngate_types::{Address, Amount};

fn rando() -> Address {
    Address::from_low_u64(0xbad)
}

#[test]
fn setters_update_pricing_and_emit() {
    let h = Harness::new();
    let c = &h.coordinator;
    c.set_premium_multiplier_bps(&owner(), 12_000).unwrap();
    c.set_max_callback_budget(&owner(), 100_000).unwrap();
    c.set_max_deadline_delta(&owner(), 600).unwrap();
    c.set_cost_basis_cap(&owner(), 7).unwrap();

    let pricing = c.pricing();
    assert_eq!(pricing.premium_multiplier_bps, 12_000);
    assert_eq!(pricing.max_callback_budget, 100_000);
    assert_eq!(pricing.max_deadline_delta, 600);
    assert_eq!(pricing.max_cost_basis, 7);
    assert_eq!(
        c.drain_events(),
        vec![
            CoordinatorEvent::PremiumMultiplierUpdated { bps: 12_000 },
            CoordinatorEvent::MaxCallbackBudgetUpdated { budget: 100_000 },
            CoordinatorEvent::MaxDeadlineDeltaUpdated { delta: 600 },
            CoordinatorEvent::CostBasisCapUpdated { cap: 7 },
        ]
    );
}

#[test]
fn new_limits_apply_to_next_request() {
    let h = Harness::new();
    h.coordinator.set_max_callback_budget(&owner(), 100_000).unwrap();
    let (price, _) = h.coordinator.request_price(100_001);
    assert!(matches!(
        h.coordinator
            .request_randomness(requester(), h.deadline(30), 100_001, price),
        Err(CoordinatorError::OverGasLimit { .. })
    ));
    h.request(requester(), 30, 100_000);
}

#[test]
fn non_owner_is_unauthorized_everywhere() {
    let h = Harness::new();
    let c = &h.coordinator;
    let other = SecretKey::from_seed(b"other").unwrap();
    let unauthorized = CoordinatorError::Unauthorized(rando());

    assert_eq!(c.set_premium_multiplier_bps(&rando(), 1).unwrap_err(), unauthorized);
    assert_eq!(c.set_max_callback_budget(&rando(), 1).unwrap_err(), unauthorized);
    assert_eq!(c.set_max_deadline_delta(&rando(), 1).unwrap_err(), unauthorized);
    assert_eq!(c.set_cost_basis_cap(&rando(), 1).unwrap_err(), unauthorized);
    assert_eq!(
        c.set_fee_estimator(
            &rando(),
            Box::new(FeeModel::for_environment(Environment::Scroll))
        )
        .unwrap_err(),
        unauthorized
    );
    assert_eq!(
        c.set_beacon(&rando(), beacon_for(&h.params, &other, GENESIS, 1))
            .unwrap_err(),
        unauthorized
    );
    assert_eq!(c.withdraw(&rando(), rando(), Amount::ZERO).unwrap_err(), unauthorized);
    assert!(c.drain_events().is_empty());
}

#[test]
fn withdraw_zero_takes_everything() {
    let h = Harness::new();
    h.request(requester(), 30, 100_000);
    h.request(requester(), 30, 200_000);
    let balance = h.coordinator.balance();
    assert!(!balance.is_zero());
    h.coordinator.drain_events();

    let taken = h.coordinator.withdraw(&owner(), owner(), Amount::ZERO).unwrap();
    assert_eq!(taken, balance);
    assert!(h.coordinator.balance().is_zero());
    assert_eq!(
        h.coordinator.drain_events(),
        vec![CoordinatorEvent::Withdrawn {
            recipient: owner(),
            amount: balance
        }]
    );
}

#[test]
fn withdraw_specific_amount_and_overdraw() {
    let h = Harness::new();
    h.request(requester(), 30, 100_000);
    let balance = h.coordinator.balance();
    let part = Amount::new(balance.raw() / 4);

    assert_eq!(h.coordinator.withdraw(&owner(), rando(), part).unwrap(), part);
    let left = h.coordinator.balance();
    assert_eq!(left, Amount::new(balance.raw() - part.raw()));

    let too_much = Amount::new(left.raw() + 1);
    assert_eq!(
        h.coordinator.withdraw(&owner(), rando(), too_much).unwrap_err(),
        CoordinatorError::InsufficientBalance {
            requested: too_much,
            available: left
        }
    );
    assert_eq!(h.coordinator.balance(), left);
}

#[test]
fn fee_estimator_update_is_announced() {
    let h = Harness::new();
    h.coordinator
        .set_fee_estimator(
            &owner(),
            Box::new(FeeModel::for_environment(Environment::OpStackFjord)),
        )
        .unwrap();
    assert_eq!(
        h.coordinator.drain_events(),
        vec![CoordinatorEvent::FeeEstimatorUpdated {
            name: "two-part/compressed".into()
        }]
    );
}

#[test]
fn type_and_version() {
    let h = Harness::new();
    assert_eq!(h.coordinator.type_and_version(), "Rngate 1.0.0");
}
