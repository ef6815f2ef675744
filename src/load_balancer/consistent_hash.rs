use std::{
    collections::{hash_map::DefaultHasher, BTreeMap},
    hash::{Hash, Hasher},
    sync::Arc,
};

use dashmap::DashMap;

use crate::{
    endpoint::Endpoint,
    error::SelectError,
    invocation::{Invocation, ServiceTarget},
    load_balancer::{state_key, LoadBalancer},
};

pub const HASH_NODES_KEY: &str = "hash.nodes";
pub const DEFAULT_HASH_NODES: i64 = 160;
pub const HASH_ARGUMENTS_KEY: &str = "hash.arguments";
pub const DEFAULT_HASH_ARGUMENTS: &str = "0";

#[derive(Default)]
pub struct ConsistentHash {
    selectors: DashMap<String, Arc<Selector>>,
}

impl LoadBalancer for ConsistentHash {
    fn select(
        &self,
        candidates: &[Arc<Endpoint>],
        target: &ServiceTarget,
        invocation: &Invocation,
    ) -> Result<Arc<Endpoint>, SelectError> {
        let key = state_key(target, invocation);
        let signature = fingerprint(candidates);

        let current = self
            .selectors
            .get(&key)
            .map(|selector| Arc::clone(&selector));
        // selectors are immutable snapshots, built off to the side and
        // republished whole; readers see the old ring or the new one
        let selector = match current {
            Some(selector) if selector.signature == signature => selector,
            _ => {
                let selector = Arc::new(Selector::build(candidates, invocation.method(), signature)?);
                debug!(
                    key = %key,
                    ring_len = selector.ring.len(),
                    "rebuilt consistent hash ring"
                );
                self.selectors.insert(key, Arc::clone(&selector));
                selector
            }
        };

        selector
            .locate(invocation)
            .ok_or(SelectError::EmptyCandidates)
    }
}

struct Selector {
    ring: BTreeMap<u64, Arc<Endpoint>>,
    signature: u64,
    argument_indexes: Vec<usize>,
}

impl Selector {
    fn build(
        candidates: &[Arc<Endpoint>],
        method: &str,
        signature: u64,
    ) -> Result<Self, SelectError> {
        let replicas = match candidates.first() {
            Some(first) => first.method_param_i64(method, HASH_NODES_KEY, DEFAULT_HASH_NODES),
            None => DEFAULT_HASH_NODES,
        };
        if replicas <= 0 || replicas % 4 != 0 {
            return Err(SelectError::MisconfiguredHashNodes(replicas));
        }

        let argument_indexes = candidates
            .first()
            .and_then(|first| first.method_param_str(method, HASH_ARGUMENTS_KEY))
            .map(parse_argument_indexes)
            .unwrap_or_else(|| parse_argument_indexes(DEFAULT_HASH_ARGUMENTS));

        let mut ring = BTreeMap::new();
        for candidate in candidates {
            for replica in 0..replicas / 4 {
                let digest = md5::compute(format!("{}{}", candidate.address(), replica));
                for part in 0..4 {
                    ring.insert(ring_point(&digest.0, part), Arc::clone(candidate));
                }
            }
        }

        Ok(Self {
            ring,
            signature,
            argument_indexes,
        })
    }

    fn locate(&self, invocation: &Invocation) -> Option<Arc<Endpoint>> {
        let mut key = String::new();
        for &index in &self.argument_indexes {
            if let Some(argument) = invocation.arguments().get(index) {
                key.push_str(argument);
            }
        }
        let digest = md5::compute(key.as_bytes());
        let hash = ring_point(&digest.0, 0);

        self.ring
            .range(hash..)
            .map(|(_, endpoint)| endpoint)
            .next()
            .or_else(|| self.ring.values().next())
            .cloned()
    }
}

// four 32-bit ring points per 16-byte digest, each window assembled low
// byte first
fn ring_point(digest: &[u8; 16], part: usize) -> u64 {
    let base = part * 4;
    (u64::from(digest[base + 3]) << 24)
        | (u64::from(digest[base + 2]) << 16)
        | (u64::from(digest[base + 1]) << 8)
        | u64::from(digest[base])
}

// membership signature and ring rebuild trigger: per-address hashes are
// combined commutatively, so the same set delivered in any order keeps the
// published ring
fn fingerprint(candidates: &[Arc<Endpoint>]) -> u64 {
    candidates
        .iter()
        .map(|candidate| {
            let mut hasher = DefaultHasher::new();
            candidate.address().hash(&mut hasher);
            hasher.finish()
        })
        .fold(0u64, u64::wrapping_add)
}

fn parse_argument_indexes(raw: &str) -> Vec<usize> {
    raw.split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return None;
            }
            match entry.parse() {
                Ok(index) => Some(index),
                Err(_) => {
                    warn!(entry = %entry, "ignoring unparsable hash.arguments entry");
                    None
                }
            }
        })
        .collect()
}
