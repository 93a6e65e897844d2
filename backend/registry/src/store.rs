//! The opaque key/value store the registry is packed into.
//!
//! The store only knows string keys and byte values. It offers no
//! compare-and-swap, so every read-modify-write built on top of it can lose
//! an update when two sessions interleave.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::Result;

#[async_trait]
pub trait OpaqueStore: Send + Sync {
    /// Liveness probe. Registry operations are skipped when this is `false`.
    async fn is_available(&self) -> Result<bool>;

    /// Read the value under `key`; an unset key yields an empty vector.
    async fn get_data(&self, key: &str) -> Result<Vec<u8>>;

    /// Upsert `value` under `key`.
    async fn set_data(&self, key: &str, value: &[u8]) -> Result<()>;
}

#[async_trait]
impl<T: OpaqueStore + ?Sized> OpaqueStore for Arc<T> {
    async fn is_available(&self) -> Result<bool> {
        (**self).is_available().await
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>> {
        (**self).get_data(key).await
    }

    async fn set_data(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set_data(key, value).await
    }
}

/// In-process store, used for local runs and tests.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    available: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Flip the liveness probe, simulating an unreachable store.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OpaqueStore for MemoryStore {
    async fn is_available(&self) -> Result<bool> {
        Ok(self.available.load(Ordering::Relaxed))
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>> {
        Ok(self.entries.read().await.get(key).cloned().unwrap_or_default())
    }

    async fn set_data(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unset_key_reads_empty() {
        let store = MemoryStore::new();
        assert!(store.get_data("project_keys").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_is_upsert() {
        let store = MemoryStore::new();
        store.set_data("k", b"one").await.unwrap();
        store.set_data("k", b"two").await.unwrap();
        assert_eq!(store.get_data("k").await.unwrap(), b"two");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn availability_toggles() {
        let store = MemoryStore::new();
        assert!(store.is_available().await.unwrap());
        store.set_available(false);
        assert!(!store.is_available().await.unwrap());
    }

    #[tokio::test]
    async fn arc_forwards_to_inner_store() {
        let shared: Arc<dyn OpaqueStore> = Arc::new(MemoryStore::new());
        shared.set_data("k", b"v").await.unwrap();
        assert_eq!(shared.get_data("k").await.unwrap(), b"v");
    }
}
