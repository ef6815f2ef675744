use std::sync::Arc;

use rand::Rng;

use crate::{
    active::{global_active_counter, ActiveCounter},
    endpoint::Endpoint,
    error::SelectError,
    invocation::{Invocation, ServiceTarget},
    load_balancer::{effective_weight, random::offset_index, LoadBalancer},
};

pub struct LeastActive {
    counter: Arc<dyn ActiveCounter>,
}

impl LeastActive {
    pub fn new(counter: Arc<dyn ActiveCounter>) -> Self {
        Self { counter }
    }
}

impl Default for LeastActive {
    fn default() -> Self {
        Self::new(global_active_counter())
    }
}

impl LoadBalancer for LeastActive {
    fn select(
        &self,
        candidates: &[Arc<Endpoint>],
        _target: &ServiceTarget,
        invocation: &Invocation,
    ) -> Result<Arc<Endpoint>, SelectError> {
        let mut least_active = 0i64;
        let mut least_indexes: Vec<usize> = Vec::with_capacity(candidates.len());
        let mut least_weights: Vec<i64> = Vec::with_capacity(candidates.len());
        let mut total_weight = 0i64;
        let mut first_weight = 0i64;
        let mut same_weight = true;

        for (index, candidate) in candidates.iter().enumerate() {
            let active = self.counter.active(candidate.address(), invocation.method());
            let weight = effective_weight(candidate, invocation);

            if least_indexes.is_empty() || active < least_active {
                least_active = active;
                least_indexes.clear();
                least_indexes.push(index);
                least_weights.clear();
                least_weights.push(weight);
                total_weight = weight.max(0);
                first_weight = weight;
                same_weight = true;
            } else if active == least_active {
                least_indexes.push(index);
                least_weights.push(weight);
                total_weight += weight.max(0);
                if weight != first_weight {
                    same_weight = false;
                }
            }
        }

        if least_indexes.len() == 1 {
            return Ok(Arc::clone(&candidates[least_indexes[0]]));
        }

        if !same_weight && total_weight > 0 {
            let offset = rand::thread_rng().gen_range(0..total_weight);
            let tie = offset_index(&least_weights, offset);
            return Ok(Arc::clone(&candidates[least_indexes[tie]]));
        }

        let tie = rand::thread_rng().gen_range(0..least_indexes.len());
        Ok(Arc::clone(&candidates[least_indexes[tie]]))
    }
}
