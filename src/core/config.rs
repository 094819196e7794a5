//! Per-call provider configuration.
//!
//! A `Config` parameterizes exactly one factory call. It is a copy-on-write
//! key/value store with value semantics: `set` consumes and returns, so a
//! caller can branch a config without affecting the original via `clone`.

use std::collections::HashMap;

use serde_json::Value;

/// Immutable key/value store with typed accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    options: HashMap<String, Value>,
}

impl Config {
    /// Create an empty config.
    pub fn new() -> Self {
        Config::default()
    }

    /// Return a new config with `key` set to `value`.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Get a raw value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// Get a string value. Empty if absent or not a string.
    pub fn get_string(&self, key: &str) -> String {
        match self.options.get(key) {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        }
    }

    /// Get a bool value. False if absent or not a bool.
    pub fn get_bool(&self, key: &str) -> bool {
        matches!(self.options.get(key), Some(Value::Bool(true)))
    }
}
