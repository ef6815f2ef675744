use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use dashmap::DashMap;
use once_cell::sync::Lazy;

static GLOBAL_COUNTER: Lazy<Arc<SharedActiveCounter>> =
    Lazy::new(|| Arc::new(SharedActiveCounter::new()));

// the selection core only reads; the RPC layer updates the counts around
// each call
pub trait ActiveCounter: Send + Sync + 'static {
    fn active(&self, address: &str, method: &str) -> i64;
}

#[derive(Default)]
pub struct SharedActiveCounter {
    counts: DashMap<String, AtomicI64>,
}

impl SharedActiveCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(self: &Arc<Self>, address: &str, method: &str) -> ActiveGuard {
        self.counts
            .entry(count_key(address, method))
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
        ActiveGuard {
            counter: Arc::clone(self),
            address: address.to_string(),
            method: method.to_string(),
        }
    }

    fn end(&self, address: &str, method: &str) {
        if let Some(count) = self.counts.get(&count_key(address, method)) {
            count.fetch_sub(1, Ordering::Relaxed);
        }
    }
}

impl ActiveCounter for SharedActiveCounter {
    fn active(&self, address: &str, method: &str) -> i64 {
        self.counts
            .get(&count_key(address, method))
            .map(|count| count.load(Ordering::Relaxed))
            .unwrap_or(0)
            .max(0)
    }
}

pub fn global_active_counter() -> Arc<SharedActiveCounter> {
    Arc::clone(&GLOBAL_COUNTER)
}

pub struct ActiveGuard {
    counter: Arc<SharedActiveCounter>,
    address: String,
    method: String,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.counter.end(&self.address, &self.method);
    }
}

fn count_key(address: &str, method: &str) -> String {
    format!("{}.{}", address, method)
}
