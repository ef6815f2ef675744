use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    address: String,
    #[serde(default)]
    start_timestamp_ms: i64,
    #[serde(default)]
    parameters: HashMap<String, String>,
}

impl Endpoint {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            start_timestamp_ms: 0,
            parameters: HashMap::new(),
        }
    }

    pub fn with_start_timestamp_ms(mut self, timestamp_ms: i64) -> Self {
        self.start_timestamp_ms = timestamp_ms;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.parameters.insert(key.into(), value.to_string());
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn start_timestamp_ms(&self) -> i64 {
        self.start_timestamp_ms
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    pub fn param_i64(&self, key: &str, default: i64) -> i64 {
        self.param_str(key)
            .and_then(|value| value.parse().ok())
            .unwrap_or(default)
    }

    // "{method}.{key}" falls back to the bare key
    pub fn method_param_str(&self, method: &str, key: &str) -> Option<&str> {
        self.parameters
            .get(&format!("{}.{}", method, key))
            .map(String::as_str)
            .or_else(|| self.param_str(key))
    }

    pub fn method_param_i64(&self, method: &str, key: &str, default: i64) -> i64 {
        self.method_param_str(method, key)
            .and_then(|value| value.parse().ok())
            .unwrap_or(default)
    }
}
