//! Subcommand implementations. Each returns the JSON document to print.

use anyhow::{anyhow, bail, Context};
use rngate_beacon::{key_id_of, round_for, round_message, Beacon};
use rngate_bls::{
    decode_g2, encode_g1, encode_g2, verify_encoded, CurveParams, EncodedG1, EncodedG2,
    HashToCurve, SecretKey,
};
use rngate_coordinator::{
    BeaconConfig, CallbackContext, CallbackError, Coordinator, CoordinatorConfig,
    RandomnessConsumer, RequestParams,
};
use rngate_fees::{CostBasis, Environment, FeeEstimator, FeeModel, PublicationBasis};
use rngate_nullables::{NullClock, NullCostOracle};
use rngate_types::{Address, Amount, Clock, Randomness, RequestId, Timestamp};
use serde_json::{json, Value};
use std::rc::Rc;

/// Genesis used by `simulate` when no config file is given.
const SIM_GENESIS: u64 = 1_700_000_000;
const SIM_PERIOD: u64 = 3;
/// Units a simulated consumer spends per delivery.
const SIM_CONSUMER_COST: u64 = 25_000;

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Compute the beacon round that satisfies a deadline.
    Round {
        /// Deadline, Unix seconds.
        #[arg(long)]
        deadline: u64,
        /// Beacon genesis (defaults to the config's beacon).
        #[arg(long)]
        genesis: Option<u64>,
        /// Beacon period in seconds (defaults to the config's beacon).
        #[arg(long)]
        period: Option<u64>,
    },

    /// Check a beacon signature for a round.
    Verify {
        #[arg(long)]
        round: u64,
        /// G1 signature, hex.
        #[arg(long)]
        signature: String,
        /// G2 public key, hex in drand order (defaults to the config's beacon).
        #[arg(long)]
        public_key: Option<String>,
        /// Hash with RFC 9380 SVDW under this tag instead of the config's map.
        #[arg(long)]
        dst: Option<String>,
    },

    /// Quote the exact payment for a callback budget.
    Quote {
        #[arg(long)]
        budget: u64,
        /// Execution cost basis per unit.
        #[arg(long, default_value_t = 1_000_000_000)]
        cost_basis: u64,
        /// Settlement-layer base fee, for two-part models.
        #[arg(long, default_value_t = 0)]
        base_fee: u64,
        /// Blob base fee, for blob-aware two-part models.
        #[arg(long, default_value_t = 0)]
        blob_base_fee: u64,
        /// Use this environment's preset fee model instead of the config's.
        #[arg(long)]
        environment: Option<Environment>,
    },

    /// Derive a development beacon key from a seed.
    Keygen {
        #[arg(long)]
        seed: String,
    },

    /// Run requests and fulfillments end to end against a local beacon key.
    Simulate {
        #[arg(long, default_value_t = 3)]
        requests: u64,
        #[arg(long, default_value_t = 100_000)]
        budget: u64,
        /// Seed of the local beacon key.
        #[arg(long, default_value = "rngate-simulation")]
        seed: String,
    },
}

pub fn run(command: Command, config: Option<&CoordinatorConfig>) -> anyhow::Result<String> {
    let value = match command {
        Command::Round {
            deadline,
            genesis,
            period,
        } => round(config, deadline, genesis, period)?,
        Command::Verify {
            round,
            signature,
            public_key,
            dst,
        } => {
            let map = match (dst, config) {
                (Some(dst), _) => HashToCurve::Svdw { dst },
                (None, Some(c)) => c.beacon.hash_to_curve.clone(),
                (None, None) => HashToCurve::default(),
            };
            verify(config, round, &signature, public_key.as_deref(), &map)?
        }
        Command::Quote {
            budget,
            cost_basis,
            base_fee,
            blob_base_fee,
            environment,
        } => {
            let basis = CostBasis {
                execution: cost_basis as u128,
                publication: PublicationBasis {
                    base_fee: base_fee as u128,
                    blob_base_fee: blob_base_fee as u128,
                },
            };
            quote(config, budget, basis, environment)?
        }
        Command::Keygen { seed } => keygen(&seed)?,
        Command::Simulate {
            requests,
            budget,
            seed,
        } => simulate(config, requests, budget, &seed)?,
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

fn round(
    config: Option<&CoordinatorConfig>,
    deadline: u64,
    genesis: Option<u64>,
    period: Option<u64>,
) -> anyhow::Result<Value> {
    let beacon = config.map(|c| &c.beacon);
    let genesis = genesis
        .or(beacon.map(|b| b.genesis_time))
        .ok_or_else(|| anyhow!("--genesis is required without a config file"))?;
    let period = period
        .or(beacon.map(|b| b.period))
        .ok_or_else(|| anyhow!("--period is required without a config file"))?;
    let round = round_for(genesis, deadline, period).ok_or_else(|| {
        anyhow!("deadline {deadline} is before genesis {genesis} or period is zero")
    })?;
    Ok(json!({
        "round": round,
        "message": hex::encode(round_message(round)),
    }))
}

fn verify(
    config: Option<&CoordinatorConfig>,
    round: u64,
    signature: &str,
    public_key: Option<&str>,
    map: &HashToCurve,
) -> anyhow::Result<Value> {
    let key = match (public_key, config) {
        (Some(key_hex), _) => EncodedG2::from_hex(key_hex).context("invalid --public-key")?,
        (None, Some(c)) => c.beacon.public_key,
        (None, None) => bail!("--public-key is required without a config file"),
    };
    let point = decode_g2(&key).context("public key is not a valid G2 point")?;
    let signature = EncodedG1::from_hex(signature).context("invalid --signature")?;
    let params = CurveParams::bn254();
    let valid = verify_encoded(&params, map, &round_message(round), &signature, &point).is_ok();
    tracing::info!(round, key_id = %key_id_of(&key), valid, "signature checked");
    if !valid {
        bail!("invalid signature for round {round}");
    }
    Ok(json!({
        "round": round,
        "key_id": key_id_of(&key),
        "map": map,
        "valid": true,
    }))
}

fn quote(
    config: Option<&CoordinatorConfig>,
    budget: u64,
    basis: CostBasis,
    environment: Option<Environment>,
) -> anyhow::Result<Value> {
    let pricing = config.map(|c| c.pricing).unwrap_or_default();
    let model = match (environment, config) {
        (Some(env), _) => FeeModel::for_environment(env),
        (None, Some(c)) => c.fees,
        (None, None) => FeeModel::default(),
    };
    model.validate()?;
    if budget > pricing.max_callback_budget {
        tracing::warn!(
            budget,
            max = pricing.max_callback_budget,
            "budget exceeds the configured maximum; a request would be rejected"
        );
    }
    let (price, effective_cost_basis) = pricing.quote(&model, budget, basis);
    Ok(json!({
        "model": model.name(),
        "callback_budget": budget,
        "price": price,
        "effective_cost_basis": effective_cost_basis,
    }))
}

fn keygen(seed: &str) -> anyhow::Result<Value> {
    let params = CurveParams::bn254();
    let sk = SecretKey::from_seed(seed.as_bytes())?;
    let public_key = encode_g2(&sk.public_key(&params));
    Ok(json!({
        "public_key": public_key,
        "key_id": key_id_of(&public_key),
    }))
}

/// Spends a fixed amount per delivery and logs what it received.
struct SimulatedConsumer;

impl RandomnessConsumer for SimulatedConsumer {
    fn on_randomness(
        &self,
        ctx: &mut CallbackContext<'_>,
        id: RequestId,
        randomness: Randomness,
    ) -> Result<(), CallbackError> {
        ctx.charge(SIM_CONSUMER_COST)?;
        tracing::debug!(
            request_id = %id,
            randomness = %randomness,
            "consumer received randomness"
        );
        Ok(())
    }
}

fn simulate(
    config: Option<&CoordinatorConfig>,
    requests: u64,
    budget: u64,
    seed: &str,
) -> anyhow::Result<Value> {
    let params = CurveParams::bn254();
    let sk = SecretKey::from_seed(seed.as_bytes())?;
    let public_key = encode_g2(&sk.public_key(&params));

    let mut config = match config {
        Some(c) => c.clone(),
        None => CoordinatorConfig::new(BeaconConfig {
            public_key,
            genesis_time: SIM_GENESIS,
            period: SIM_PERIOD,
            hash_to_curve: HashToCurve::default(),
        }),
    };
    config.beacon.public_key = public_key;

    let clock = NullClock::new(config.beacon.genesis_time.saturating_add(1_000));
    let coordinator = Coordinator::from_config(
        &config,
        params,
        Box::new(clock.clone()),
        Box::new(NullCostOracle::flat(1_000_000_000)),
    )?;
    let beacon: Beacon = coordinator
        .beacon(&coordinator.current_beacon_key_id())
        .ok_or_else(|| anyhow!("coordinator has no current beacon"))?;

    let requester = Address::from_low_u64(0x5151);
    coordinator.register_consumer(requester, Rc::new(SimulatedConsumer));

    let mut pending = Vec::new();
    for i in 0..requests {
        let now = clock.now();
        let deadline = now.saturating_add(beacon.period() * (i + 1));
        let (price, _) = coordinator.request_price(budget);
        let id = coordinator.request_randomness(requester, deadline, budget, price)?;
        pending.push(RequestParams {
            id,
            requester,
            key_id: beacon.key_id(),
            round: beacon.round(deadline)?,
            callback_budget: budget,
        });
    }

    let mut fulfillments = Vec::new();
    for request in &pending {
        if !beacon.is_round_available(request.round, clock.now()) {
            let available_at: Timestamp = beacon.time_of_round(request.round);
            clock.set(available_at.as_secs());
        }
        let message = round_message(request.round);
        let signature = encode_g1(&sk.sign(&params, beacon.hash_to_curve(), &message)?);
        fulfillments.push(coordinator.fulfill_randomness(request, &signature)?);
    }

    let collected: Amount = coordinator.balance();
    Ok(json!({
        "deployment": coordinator.deployment(),
        "key_id": beacon.key_id(),
        "map": beacon.hash_to_curve(),
        "fulfillments": fulfillments,
        "events": coordinator.drain_events(),
        "balance": collected,
    }))
}
