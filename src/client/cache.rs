//! Query cache keyed by endpoint path.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Cached JSON responses. Invalidating a key also drops every key nested under it
/// (`/api/galleries` covers `/api/galleries/<id>/photos`).
#[derive(Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<String, Value>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entries = self.entries.lock().ok()?;
        let value = entries.get(key)?.clone();
        serde_json::from_value(value).ok()
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) {
        let Ok(value) = serde_json::to_value(value) else {
            return;
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value);
        }
    }

    pub fn invalidate(&self, key: &str) {
        let nested = format!("{}/", key.trim_end_matches('/'));
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|k, _| k != key && !k.starts_with(&nested));
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().map(|e| e.contains_key(key)).unwrap_or(false)
    }
}
