//! Shared fixtures for the in-crate tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::errors::{RegistryError, Result};
use crate::reveal::{SignError, Signature, Signer};
use crate::store::{MemoryStore, OpaqueStore};

/// Wraps a [`MemoryStore`], failing reads/writes of chosen keys and counting
/// writes.
pub struct FlakyStore {
    pub inner: MemoryStore,
    failing_reads: Mutex<HashSet<String>>,
    failing_writes: Mutex<HashSet<String>>,
    writes: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(),
            failing_reads: Mutex::new(HashSet::new()),
            failing_writes: Mutex::new(HashSet::new()),
            writes: AtomicUsize::new(0),
        })
    }

    pub fn fail_reads_of(&self, key: &str) {
        self.failing_reads.lock().unwrap().insert(key.to_string());
    }

    pub fn fail_writes_of(&self, key: &str) {
        self.failing_writes.lock().unwrap().insert(key.to_string());
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Write straight to the backing map, bypassing counters and failures.
    pub async fn seed(&self, key: &str, value: &[u8]) {
        self.inner.set_data(key, value).await.unwrap();
    }
}

#[async_trait]
impl OpaqueStore for FlakyStore {
    async fn is_available(&self) -> Result<bool> {
        self.inner.is_available().await
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>> {
        let fail = self.failing_reads.lock().unwrap().contains(key);
        if fail {
            return Err(RegistryError::Store(format!("read of {key} failed")));
        }
        self.inner.get_data(key).await
    }

    async fn set_data(&self, key: &str, value: &[u8]) -> Result<()> {
        let fail = self.failing_writes.lock().unwrap().contains(key);
        if fail {
            return Err(RegistryError::Store(format!("write of {key} failed")));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set_data(key, value).await
    }
}

/// Signer that always signs and records every message it was asked to sign.
#[derive(Default)]
pub struct RecordingSigner {
    pub messages: Mutex<Vec<String>>,
}

#[async_trait]
impl Signer for RecordingSigner {
    async fn sign(&self, message: &str) -> std::result::Result<Signature, SignError> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(Signature::new(vec![0xab; 65]))
    }
}

/// Signer whose user always declines.
pub struct RejectingSigner;

#[async_trait]
impl Signer for RejectingSigner {
    async fn sign(&self, _message: &str) -> std::result::Result<Signature, SignError> {
        Err(SignError::Rejected)
    }
}
