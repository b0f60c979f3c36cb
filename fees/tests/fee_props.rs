use proptest::prelude::*;
use rngate_fees::{CostBasis, Environment, FeeEstimator, FeeModel, PublicationBasis};

fn environments() -> impl Strategy<Value = Environment> {
    prop_oneof![
        Just(Environment::Ethereum),
        Just(Environment::OpStackBedrock),
        Just(Environment::OpStackEcotone),
        Just(Environment::OpStackFjord),
        Just(Environment::Scroll),
    ]
}

fn bases() -> impl Strategy<Value = CostBasis> {
    (0u128..1_000_000_000_000, 0u128..1_000_000_000_000, 0u128..1_000_000_000_000).prop_map(
        |(execution, base_fee, blob_base_fee)| CostBasis {
            execution,
            publication: PublicationBasis {
                base_fee,
                blob_base_fee,
            },
        },
    )
}

proptest! {
    #[test]
    fn cost_is_monotone_in_budget(
        env in environments(),
        basis in bases(),
        a in 0u64..10_000_000,
        b in 0u64..10_000_000
    ) {
        let model = FeeModel::for_environment(env);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(model.estimate_cost(lo, &basis) <= model.estimate_cost(hi, &basis));
    }

    #[test]
    fn cost_is_monotone_in_execution_price(
        env in environments(),
        basis in bases(),
        bump in 0u128..1_000_000_000,
        budget in 0u64..10_000_000
    ) {
        let model = FeeModel::for_environment(env);
        let higher = CostBasis { execution: basis.execution + bump, ..basis };
        prop_assert!(model.estimate_cost(budget, &basis) <= model.estimate_cost(budget, &higher));
    }

    #[test]
    fn capping_never_raises_cost(
        env in environments(),
        basis in bases(),
        cap in 0u128..1_000_000_000_000,
        budget in 0u64..10_000_000
    ) {
        let model = FeeModel::for_environment(env);
        let capped = model.estimate_cost(budget, &basis.capped(cap));
        prop_assert!(capped <= model.estimate_cost(budget, &basis));
    }
}
