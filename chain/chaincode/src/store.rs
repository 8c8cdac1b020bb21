//! Key/value state abstraction
//!
//! The ledger runtime owns durability and consensus; the chaincode only sees a
//! flat key space with single-key atomic `get`/`put` and no cross-key
//! transactions.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::errors::StoreError;

/// Ledger key/value state.
pub trait KvStore: Send + Sync {
    /// Read the value at `key`. `Ok(None)` when nothing is stored.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write `value` at `key`, replacing any previous value.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
}

/// In-memory ordered state, for tests and local tooling.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys. Still readable after a writer panicked.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Read {
            key: key.to_string(),
            reason: "state lock poisoned".to_string(),
        })?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Write {
            key: key.to_string(),
            reason: "state lock poisoned".to_string(),
        })?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_put_then_get() {
        let store = MemoryStore::new();
        store.put("k", b"v1").unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"v1".to_vec()));
    }

    #[test]
    fn test_put_overwrites() {
        let store = MemoryStore::new();
        store.put("k", b"v1").unwrap();
        store.put("k", b"v2").unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"v2".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_keys_sorted() {
        let store = MemoryStore::new();
        store.put("b", b"").unwrap();
        store.put("a", b"").unwrap();
        assert_eq!(store.keys(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_inspection_survives_poisoned_lock() {
        let store = std::sync::Arc::new(MemoryStore::new());
        store.put("a", b"1").unwrap();
        store.put("b", b"2").unwrap();

        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.entries.write().unwrap();
            panic!("writer died holding the state lock");
        })
        .join();

        assert!(store.entries.is_poisoned());
        assert_eq!(store.len(), 2);
        assert!(!store.is_empty());
        assert_eq!(store.keys(), vec!["a".to_string(), "b".to_string()]);
        assert!(store.get("a").is_err());
    }
}
