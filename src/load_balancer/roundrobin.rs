use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use dashmap::DashMap;

use crate::{
    endpoint::Endpoint,
    error::SelectError,
    invocation::{Invocation, ServiceTarget},
    load_balancer::{effective_weight, state_key, LoadBalancer},
};

#[derive(Default)]
pub struct RoundRobin {
    sequences: DashMap<String, AtomicU64>,
}

impl LoadBalancer for RoundRobin {
    fn select(
        &self,
        candidates: &[Arc<Endpoint>],
        target: &ServiceTarget,
        invocation: &Invocation,
    ) -> Result<Arc<Endpoint>, SelectError> {
        let mut min_weight = i64::MAX;
        let mut max_weight = 0i64;
        let mut weight_sum = 0u64;
        // remaining quota per candidate with a positive weight, in input order
        let mut quotas: Vec<(usize, i64)> = Vec::with_capacity(candidates.len());

        for (index, candidate) in candidates.iter().enumerate() {
            let weight = effective_weight(candidate, invocation);
            min_weight = min_weight.min(weight);
            max_weight = max_weight.max(weight);
            if weight > 0 {
                quotas.push((index, weight));
                weight_sum += weight as u64;
            }
        }

        let seq = self
            .sequences
            .entry(state_key(target, invocation))
            .or_default()
            .fetch_add(1, Ordering::Relaxed);

        if max_weight > 0 && min_weight < max_weight {
            // deficit walk in input order: one cycle of sum(weights) calls
            // picks each endpoint exactly weight times. O(max_weight * len)
            // in the worst case.
            let mut deficit = seq % weight_sum;
            for _ in 0..max_weight {
                for (index, quota) in quotas.iter_mut() {
                    if deficit == 0 && *quota > 0 {
                        return Ok(Arc::clone(&candidates[*index]));
                    }
                    if *quota > 0 {
                        *quota -= 1;
                        deficit -= 1;
                    }
                }
            }
        }

        Ok(Arc::clone(&candidates[(seq % candidates.len() as u64) as usize]))
    }
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
    fn uniform_weights_rotate_in_order() {
        let candidates = endpoints(&[100, 100, 100]);
        let target = ServiceTarget::new("com.example.UserService");
        let invocation = Invocation::new("find");
        let balancer = RoundRobin::default();

        let picks: Vec<String> = (0..6)
            .map(|_| {
                balancer
                    .select(&candidates, &target, &invocation)
                    .unwrap()
                    .address()
                    .to_string()
            })
            .collect();

        assert_eq!(
            picks,
            vec![
                "10.0.0.1:20880",
                "10.0.0.2:20880",
                "10.0.0.3:20880",
                "10.0.0.1:20880",
                "10.0.0.2:20880",
                "10.0.0.3:20880",
            ]
        );
    }

    #[test]
    fn weighted_cycle_honors_the_quotas() {
        let candidates = endpoints(&[5, 1, 1]);
        let target = ServiceTarget::new("com.example.UserService");
        let invocation = Invocation::new("find");
        let balancer = RoundRobin::default();

        let mut hits: HashMap<String, u32> = HashMap::new();
        for _ in 0..7 {
            let selected = balancer.select(&candidates, &target, &invocation).unwrap();
            *hits.entry(selected.address().to_string()).or_default() += 1;
        }

        assert_eq!(hits["10.0.0.1:20880"], 5);
        assert_eq!(hits["10.0.0.2:20880"], 1);
        assert_eq!(hits["10.0.0.3:20880"], 1);
    }

    #[test]
    fn weighted_cycle_order_is_deterministic() {
        let candidates = endpoints(&[5, 1, 1]);
        let target = ServiceTarget::new("com.example.UserService");
        let invocation = Invocation::new("find");

        // the deficit walk visits every quota-holder once before the
        // heaviest endpoint drains the rest of the cycle
        let expected = vec![
            "10.0.0.1:20880",
            "10.0.0.2:20880",
            "10.0.0.3:20880",
            "10.0.0.1:20880",
            "10.0.0.1:20880",
            "10.0.0.1:20880",
            "10.0.0.1:20880",
        ];

        for _ in 0..3 {
            let balancer = RoundRobin::default();
            let picks: Vec<String> = (0..7)
                .map(|_| {
                    balancer
                        .select(&candidates, &target, &invocation)
                        .unwrap()
                        .address()
                        .to_string()
                })
                .collect();
            assert_eq!(picks, expected);
        }
    }

    #[test]
    fn sequences_are_scoped_per_method() {
        let candidates = endpoints(&[100, 100]);
        let target = ServiceTarget::new("com.example.UserService");
        let balancer = RoundRobin::default();

        let first_find = balancer
            .select(&candidates, &target, &Invocation::new("find"))
            .unwrap();
        let first_list = balancer
            .select(&candidates, &target, &Invocation::new("list"))
            .unwrap();

        // each method starts its own rotation at the first candidate
        assert_eq!(first_find.address(), first_list.address());
    }

    #[test]
    fn counter_survives_candidate_set_changes() {
        let target = ServiceTarget::new("com.example.UserService");
        let invocation = Invocation::new("find");
        let balancer = RoundRobin::default();

        let three = endpoints(&[100, 100, 100]);
        assert_eq!(
            balancer
                .select(&three, &target, &invocation)
                .unwrap()
                .address(),
            "10.0.0.1:20880"
        );
        assert_eq!(
            balancer
                .select(&three, &target, &invocation)
                .unwrap()
                .address(),
            "10.0.0.2:20880"
        );

        // dropping to two candidates keeps rotating from the same sequence
        let two = endpoints(&[100, 100]);
        assert_eq!(
            balancer.select(&two, &target, &invocation).unwrap().address(),
            "10.0.0.1:20880"
        );
    }

    #[test]
    fn zero_weight_endpoint_gets_no_quota() {
        let candidates = endpoints(&[0, 3, 1]);
        let target = ServiceTarget::new("com.example.UserService");
        let invocation = Invocation::new("find");
        let balancer = RoundRobin::default();

        for _ in 0..8 {
            let selected = balancer.select(&candidates, &target, &invocation).unwrap();
            assert_ne!(selected.address(), "10.0.0.1:20880");
        }
    }
}
