mod consistent_hash;
mod least_active;
mod random;
mod roundrobin;
mod weight;

use std::sync::Arc;

pub use consistent_hash::{
    ConsistentHash, DEFAULT_HASH_ARGUMENTS, DEFAULT_HASH_NODES, HASH_ARGUMENTS_KEY, HASH_NODES_KEY,
};
pub use least_active::LeastActive;
pub use random::Random;
pub use roundrobin::RoundRobin;
pub use weight::{effective_weight, DEFAULT_WARMUP_MS, DEFAULT_WEIGHT, WARMUP_KEY, WEIGHT_KEY};

use crate::{
    endpoint::Endpoint,
    error::SelectError,
    invocation::{Invocation, ServiceTarget},
};

// `candidates` is never empty: the dispatcher rejects empty input and
// short-circuits a single candidate before any policy runs
pub trait LoadBalancer: Send + Sync + 'static {
    fn select(
        &self,
        candidates: &[Arc<Endpoint>],
        target: &ServiceTarget,
        invocation: &Invocation,
    ) -> Result<Arc<Endpoint>, SelectError>;
}

pub(crate) fn state_key(target: &ServiceTarget, invocation: &Invocation) -> String {
    format!("{}.{}", target.service_key(), invocation.method())
}
