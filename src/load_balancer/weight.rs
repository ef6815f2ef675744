use std::time::{SystemTime, UNIX_EPOCH};

use crate::{endpoint::Endpoint, invocation::Invocation};

pub const WEIGHT_KEY: &str = "weight";
pub const DEFAULT_WEIGHT: i64 = 100;
pub const WARMUP_KEY: &str = "warmup";
pub const DEFAULT_WARMUP_MS: i64 = 600_000;

// a configured weight <= 0 passes through and excludes the endpoint from
// weighted selection
pub fn effective_weight(endpoint: &Endpoint, invocation: &Invocation) -> i64 {
    let weight = endpoint.method_param_i64(invocation.method(), WEIGHT_KEY, DEFAULT_WEIGHT);
    if weight <= 0 {
        return weight;
    }

    let started = endpoint.start_timestamp_ms();
    if started <= 0 {
        return weight;
    }

    let uptime = now_millis() - started;
    let warmup = endpoint.method_param_i64(invocation.method(), WARMUP_KEY, DEFAULT_WARMUP_MS);
    if uptime > 0 && uptime < warmup {
        warmup_weight(uptime, warmup, weight)
    } else {
        weight
    }
}

// linear ramp from 1 up to the configured weight across the warm-up window
fn warmup_weight(uptime: i64, warmup: i64, weight: i64) -> i64 {
    let ramped = (uptime as f64 / (warmup as f64 / weight as f64)) as i64;
    ramped.clamp(1, weight)
}

pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
