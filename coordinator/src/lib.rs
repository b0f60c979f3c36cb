//! Randomness coordinator.
//!
//! Accepts paid requests for randomness at a future beacon round, stores only
//! a commitment to each request, and later accepts a beacon signature that
//! matches both the commitment and the beacon key the request was made under.
//! The derived randomness is delivered to the requester's consumer under a
//! metered budget; consumer failures are recorded, never propagated.

pub mod access;
pub mod callback;
pub mod commitment;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod lock;

pub use access::{AccessControl, OwnerOnly};
pub use callback::{
    Budget, CallbackContext, CallbackFailure, ConsumerRegistry, RandomnessConsumer,
};
pub use commitment::{derive_randomness, request_commitment, RequestParams};
pub use config::{BeaconConfig, CoordinatorConfig, PricingConfig};
pub use coordinator::{Coordinator, Deployment, Fulfillment, RandomnessService, TYPE_AND_VERSION};
pub use error::{CallbackError, CoordinatorError};
pub use events::CoordinatorEvent;
pub use lock::{LockGuard, ReentrancyLock};
