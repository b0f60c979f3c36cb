//! Request commitments and randomness derivation.
//!
//! Every value is hashed as a sequence of 32-byte words; integers and
//! addresses are left-padded.

use rngate_bls::EncodedG1;
use rngate_types::{Address, Commitment, KeyId, Randomness, RequestId, WordEncoder};
use serde::{Deserialize, Serialize};

/// The full parameter tuple of a request. Only its commitment is stored, so
/// a fulfiller must supply it verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestParams {
    pub id: RequestId,
    pub requester: Address,
    pub key_id: KeyId,
    pub round: u64,
    pub callback_budget: u64,
}

/// `keccak256(chain_id, coordinator, id, requester, key_id, round, callback_budget)`.
pub fn request_commitment(
    chain_id: u64,
    coordinator: &Address,
    params: &RequestParams,
) -> Commitment {
    WordEncoder::new()
        .uint(chain_id)
        .address(coordinator)
        .uint(params.id.get())
        .address(&params.requester)
        .word(params.key_id.as_bytes())
        .uint(params.round)
        .uint(params.callback_budget)
        .keccak()
}

/// `keccak256(sig.x, sig.y, chain_id, coordinator, id, requester)`.
pub fn derive_randomness(
    chain_id: u64,
    coordinator: &Address,
    id: RequestId,
    requester: &Address,
    signature: &EncodedG1,
) -> Randomness {
    WordEncoder::new()
        .word(&signature.x_word())
        .word(&signature.y_word())
        .uint(chain_id)
        .address(coordinator)
        .uint(id.get())
        .address(requester)
        .keccak()
}
