//! Injected key-value storage for browser-local credentials.
//!
//! The gate and the backend client never touch ambient global state; they are
//! handed a [`TokenStore`] instead, which keeps the access-token lifecycle
//! deterministic under test.

use std::collections::HashMap;
use std::sync::RwLock;

/// Key under which the bearer credential for outbound API calls is stored.
pub const ACCESS_TOKEN_KEY: &str = "token";

pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-process store backing the gateway. Reads and writes are not coordinated
/// across instances, mirroring the browser's uncoordinated tabs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }
}
