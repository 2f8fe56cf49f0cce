use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::StoreError;

/// Read-only access to a key-value parameter store.
///
/// This is the only capability the populator needs from its environment.
/// Implementations fetch the value stored under `key`, decrypting secrets,
/// and pass the store's failures through without retrying or reinterpreting
/// them.
pub trait ParameterStore: Send + Sync {
    fn fetch(&self, key: &str) -> Result<String, StoreError>;
}

impl<S: ParameterStore + ?Sized> ParameterStore for &S {
    fn fetch(&self, key: &str) -> Result<String, StoreError> {
        (**self).fetch(key)
    }
}

impl<S: ParameterStore + ?Sized> ParameterStore for Box<S> {
    fn fetch(&self, key: &str) -> Result<String, StoreError> {
        (**self).fetch(key)
    }
}

impl<S: ParameterStore + ?Sized> ParameterStore for Arc<S> {
    fn fetch(&self, key: &str) -> Result<String, StoreError> {
        (**self).fetch(key)
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemoryStore
// ═══════════════════════════════════════════════════════════════

/// In-process store backed by a map.
///
/// Keeps a log of every key requested, hits and misses alike, in request
/// order. Useful for local runs and for asserting traversal order in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    fetched: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Store `value` under `key`, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys requested so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.log().clone()
    }

    /// Forget the request log. Stored values are kept.
    pub fn clear_fetched(&self) {
        self.log().clear();
    }

    fn log(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        match self.fetched.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("memory store request log was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

impl ParameterStore for MemoryStore {
    fn fetch(&self, key: &str) -> Result<String, StoreError> {
        self.log().push(key.to_string());
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = MemoryStore::new();
        for (key, value) in iter {
            store.insert(key, value);
        }
        store
    }
}
