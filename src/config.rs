use std::sync::Arc;

use anyhow::Result;
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};

use crate::load_balancer::{ConsistentHash, LeastActive, LoadBalancer, Random, RoundRobin};

#[typetag::serde(tag = "policy")]
pub trait BalancerConfig: DynClone + Send + Sync + 'static {
    fn create(&self) -> Result<Arc<dyn LoadBalancer>>;
}

dyn_clone::clone_trait_object!(BalancerConfig);

#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RandomConfig {}

#[typetag::serde(name = "random")]
impl BalancerConfig for RandomConfig {
    fn create(&self) -> Result<Arc<dyn LoadBalancer>> {
        Ok(Arc::new(Random))
    }
}

#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RoundRobinConfig {}

#[typetag::serde(name = "roundrobin")]
impl BalancerConfig for RoundRobinConfig {
    fn create(&self) -> Result<Arc<dyn LoadBalancer>> {
        Ok(Arc::new(RoundRobin::default()))
    }
}

#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct LeastActiveConfig {}

#[typetag::serde(name = "leastactive")]
impl BalancerConfig for LeastActiveConfig {
    fn create(&self) -> Result<Arc<dyn LoadBalancer>> {
        Ok(Arc::new(LeastActive::default()))
    }
}

#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConsistentHashConfig {}

#[typetag::serde(name = "consistenthash")]
impl BalancerConfig for ConsistentHashConfig {
    fn create(&self) -> Result<Arc<dyn LoadBalancer>> {
        Ok(Arc::new(ConsistentHash::default()))
    }
}
