use std::sync::Arc;

use rand::Rng;

use crate::{
    endpoint::Endpoint,
    error::SelectError,
    invocation::{Invocation, ServiceTarget},
    load_balancer::{effective_weight, LoadBalancer},
};

#[derive(Default)]
pub struct Random;

impl LoadBalancer for Random {
    fn select(
        &self,
        candidates: &[Arc<Endpoint>],
        _target: &ServiceTarget,
        invocation: &Invocation,
    ) -> Result<Arc<Endpoint>, SelectError> {
        let mut weights = Vec::with_capacity(candidates.len());
        let mut total = 0i64;
        let mut same_weight = true;

        for (i, candidate) in candidates.iter().enumerate() {
            let weight = effective_weight(candidate, invocation);
            if i > 0 && weight != weights[0] {
                same_weight = false;
            }
            total += weight.max(0);
            weights.push(weight);
        }

        if total > 0 && !same_weight {
            let offset = rand::thread_rng().gen_range(0..total);
            return Ok(Arc::clone(&candidates[offset_index(&weights, offset)]));
        }

        let index = rand::thread_rng().gen_range(0..candidates.len());
        Ok(Arc::clone(&candidates[index]))
    }
}

// maps a draw from [0, sum of positive weights) onto a candidate index;
// non-positive weights are never landed on
pub(crate) fn offset_index(weights: &[i64], mut offset: i64) -> usize {
    for (index, weight) in weights.iter().enumerate() {
        offset -= (*weight).max(0);
        if offset < 0 {
            return index;
        }
    }
    weights.len() - 1
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn endpoints(weights: &[i64]) -> Vec<Arc<Endpoint>> {
        weights
            .iter()
            .enumerate()
            .map(|(i, weight)| {
                Arc::new(Endpoint::new(format!("10.0.0.{}:20880", i + 1)).with_param("weight", weight))
            })
            .collect()
    }

    #[test]
    fn offsets_walk_the_prefix_sums() {
        let weights = [6, 3, 1];
        let picks: Vec<usize> = [0, 5, 6, 8, 9]
            .iter()
            .map(|&offset| offset_index(&weights, offset))
            .collect();
        assert_eq!(picks, vec![0, 0, 1, 1, 2]);
    }

    #[test]
    fn zero_weight_is_never_landed_on() {
        let weights = [0, 5, 0, 5];
        for offset in 0..10 {
            let index = offset_index(&weights, offset);
            assert!(index == 1 || index == 3);
        }
    }

    #[test]
    fn always_returns_a_candidate() {
        let candidates = endpoints(&[6, 3, 1]);
        let target = ServiceTarget::new("com.example.UserService");
        let invocation = Invocation::new("find");
        let balancer = Random;

        for _ in 0..100 {
            let selected = balancer.select(&candidates, &target, &invocation).unwrap();
            assert!(candidates.iter().any(|c| Arc::ptr_eq(c, &selected)));
        }
    }

    #[test]
    fn frequencies_follow_the_weights() {
        let candidates = endpoints(&[6, 3, 1]);
        let target = ServiceTarget::new("com.example.UserService");
        let invocation = Invocation::new("find");
        let balancer = Random;

        let mut hits: HashMap<String, u32> = HashMap::new();
        let draws = 20_000;
        for _ in 0..draws {
            let selected = balancer.select(&candidates, &target, &invocation).unwrap();
            *hits.entry(selected.address().to_string()).or_default() += 1;
        }

        let share = |address: &str| f64::from(hits[address]) / f64::from(draws);
        assert!((share("10.0.0.1:20880") - 0.6).abs() < 0.05);
        assert!((share("10.0.0.2:20880") - 0.3).abs() < 0.05);
        assert!((share("10.0.0.3:20880") - 0.1).abs() < 0.05);
    }

    #[test]
    fn zero_weight_endpoint_is_excluded() {
        let candidates = endpoints(&[0, 5, 5]);
        let target = ServiceTarget::new("com.example.UserService");
        let invocation = Invocation::new("find");
        let balancer = Random;

        for _ in 0..200 {
            let selected = balancer.select(&candidates, &target, &invocation).unwrap();
            assert_ne!(selected.address(), "10.0.0.1:20880");
        }
    }
}
