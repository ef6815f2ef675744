#[macro_use]
extern crate tracing;

mod active;
mod config;
mod dispatcher;
mod endpoint;
mod error;
mod invocation;
mod load_balancer;

pub use active::{global_active_counter, ActiveCounter, ActiveGuard, SharedActiveCounter};
pub use config::{
    BalancerConfig, ConsistentHashConfig, LeastActiveConfig, RandomConfig, RoundRobinConfig,
};
pub use dispatcher::Dispatcher;
pub use endpoint::Endpoint;
pub use error::SelectError;
pub use invocation::{Invocation, ServiceTarget};
pub use load_balancer::{
    effective_weight, ConsistentHash, LeastActive, LoadBalancer, Random, RoundRobin,
    DEFAULT_HASH_ARGUMENTS, DEFAULT_HASH_NODES, DEFAULT_WARMUP_MS, DEFAULT_WEIGHT,
    HASH_ARGUMENTS_KEY, HASH_NODES_KEY, WARMUP_KEY, WEIGHT_KEY,
};
