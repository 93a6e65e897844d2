//! Append-only key registry over an [`OpaqueStore`].
//!
//! A namespace `ns` owns two kinds of keys:
//!
//! | Key           | Value                                  |
//! |---------------|----------------------------------------|
//! | `{ns}_keys`   | JSON array of record ids, append order |
//! | `{ns}_{id}`   | Record payload (UTF-8 JSON)            |
//!
//! ## Consistency
//!
//! [`Registry::append_key`] is a read followed by a write with nothing in
//! between to stop another session from doing the same. Two concurrent appends
//! can therefore drop one id (last writer wins on the key list). Writing a
//! record and appending its id are two separate store calls, so a record can
//! exist without being listed, and a listed id can point at nothing. Callers
//! must tolerate both.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::errors::{RegistryError, Result};
use crate::store::OpaqueStore;

pub struct Registry<S> {
    store: S,
    namespace: String,
}

impl<S: OpaqueStore> Registry<S> {
    pub fn new(store: S, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    /// Store key holding the id list for this namespace.
    pub fn keys_key(&self) -> String {
        format!("{}_keys", self.namespace)
    }

    /// Store key holding the record `id`.
    pub fn record_key(&self, id: &str) -> String {
        format!("{}_{}", self.namespace, id)
    }

    pub async fn is_available(&self) -> Result<bool> {
        self.store.is_available().await
    }

    /// Read the id list.
    ///
    /// Unset, blank or malformed lists all read as empty; only store I/O
    /// failures are returned as errors.
    pub async fn list_keys(&self) -> Result<Vec<String>> {
        let bytes = self.store.get_data(&self.keys_key()).await?;
        Ok(self.parse_keys(&bytes))
    }

    /// Append `id` to the id list.
    ///
    /// A malformed list is replaced by one holding only `id`.
    pub async fn append_key(&self, id: &str) -> Result<()> {
        let mut keys = self.list_keys().await?;
        keys.push(id.to_string());
        let encoded = serde_json::to_vec(&keys)?;
        self.store.set_data(&self.keys_key(), &encoded).await?;
        debug!("{}: appended {id} ({} ids)", self.namespace, keys.len());
        Ok(())
    }

    /// Read the payload of `id`; `None` when it was never written.
    pub async fn get_record(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let bytes = self.store.get_data(&self.record_key(id)).await?;
        Ok(if bytes.is_empty() { None } else { Some(bytes) })
    }

    pub async fn put_record(&self, id: &str, payload: &[u8]) -> Result<()> {
        self.store.set_data(&self.record_key(id), payload).await
    }

    /// Load and parse every listed record, in key-list order.
    ///
    /// Never fails: an unavailable store or unreadable key list yields an
    /// empty result, and any single id whose record is missing, unreadable or
    /// unparsable is skipped with a warning.
    pub async fn load_records<T: DeserializeOwned>(&self) -> Vec<(String, T)> {
        match self.is_available().await {
            Ok(true) => {}
            Ok(false) => {
                debug!("{}: store unavailable, nothing to load", self.namespace);
                return Vec::new();
            }
            Err(e) => {
                warn!("Error checking store availability: {e}");
                return Vec::new();
            }
        }

        let keys = match self.list_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Error loading {} keys: {e}", self.namespace);
                return Vec::new();
            }
        };

        let mut records = Vec::with_capacity(keys.len());
        for id in keys {
            match self.load_record(&id).await {
                Ok(Some(record)) => records.push((id, record)),
                Ok(None) => debug!("{}: {id} is listed but has no record", self.namespace),
                Err(e) => warn!("Error loading {} {id}: {e}", self.namespace),
            }
        }
        records
    }

    async fn load_record<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>> {
        match self.get_record(id).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(RegistryError::from),
            None => Ok(None),
        }
    }

    fn parse_keys(&self, bytes: &[u8]) -> Vec<String> {
        if bytes.is_empty() {
            return Vec::new();
        }
        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!("Error parsing {} keys: {e}", self.namespace);
                return Vec::new();
            }
        };
        if text.trim().is_empty() {
            return Vec::new();
        }
        serde_json::from_str(text).unwrap_or_else(|e| {
            warn!("Error parsing {} keys: {e}", self.namespace);
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn registry() -> (Arc<MemoryStore>, Registry<Arc<MemoryStore>>) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), Registry::new(store, "project"))
    }

    #[test]
    fn keys_are_derived_from_namespace() {
        let (_, reg) = registry();
        assert_eq!(reg.keys_key(), "project_keys");
        assert_eq!(reg.record_key("proj-1-abcd"), "project_proj-1-abcd");
    }

    #[tokio::test]
    async fn unset_key_list_is_empty() {
        let (_, reg) = registry();
        assert!(reg.list_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_key_list_is_empty() {
        let (store, reg) = registry();
        store.set_data("project_keys", b"   ").await.unwrap();
        assert!(reg.list_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_key_list_is_empty() {
        let (store, reg) = registry();
        store.set_data("project_keys", b"{not json").await.unwrap();
        assert!(reg.list_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_preserves_order() {
        let (store, reg) = registry();
        reg.append_key("a").await.unwrap();
        reg.append_key("b").await.unwrap();
        reg.append_key("c").await.unwrap();

        assert_eq!(reg.list_keys().await.unwrap(), vec!["a", "b", "c"]);
        assert_eq!(
            store.get_data("project_keys").await.unwrap(),
            br#"["a","b","c"]"#
        );
    }

    #[tokio::test]
    async fn append_replaces_malformed_list() {
        let (store, reg) = registry();
        store.set_data("project_keys", b"garbage").await.unwrap();
        reg.append_key("fresh").await.unwrap();
        assert_eq!(reg.list_keys().await.unwrap(), vec!["fresh"]);
    }

    #[tokio::test]
    async fn missing_record_is_none() {
        let (_, reg) = registry();
        assert!(reg.get_record("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_then_get_record() {
        let (_, reg) = registry();
        reg.put_record("x", b"{}").await.unwrap();
        assert_eq!(reg.get_record("x").await.unwrap().as_deref(), Some(&b"{}"[..]));
    }

    #[tokio::test]
    async fn load_records_skips_missing_and_malformed() {
        let (_, reg) = registry();
        reg.put_record("good", br#"{"n":1}"#).await.unwrap();
        reg.put_record("bad", b"{oops").await.unwrap();
        for id in ["good", "bad", "ghost"] {
            reg.append_key(id).await.unwrap();
        }

        let loaded: Vec<(String, serde_json::Value)> = reg.load_records().await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].0, "good");
        assert_eq!(loaded[0].1["n"], 1);
    }

    #[tokio::test]
    async fn load_records_on_unavailable_store_is_empty() {
        let (store, reg) = registry();
        reg.put_record("a", b"{}").await.unwrap();
        reg.append_key("a").await.unwrap();
        store.set_available(false);

        let loaded: Vec<(String, serde_json::Value)> = reg.load_records().await;
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn namespaces_do_not_overlap() {
        let store = Arc::new(MemoryStore::new());
        let projects = Registry::new(store.clone(), "project");
        let forum = Registry::new(store, "forum");

        projects.append_key("p1").await.unwrap();
        forum.append_key("f1").await.unwrap();

        assert_eq!(projects.list_keys().await.unwrap(), vec!["p1"]);
        assert_eq!(forum.list_keys().await.unwrap(), vec!["f1"]);
    }
}
