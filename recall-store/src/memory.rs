//! In-memory store backend
//!
//! Reference [`CacheStore`] implementation used by tests and small
//! deployments. Honors absolute and sliding expiration; sliding deadlines
//! advance on every successful read. Also carries failure-injection toggles
//! and operation counters so engine tests can exercise the fail-open paths
//! without a real store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use recall_core::{Expiration, StoreError};

use crate::store::CacheStore;

#[derive(Debug, Clone)]
enum Expiry {
    Never,
    At(Instant),
    Sliding { window: Duration, deadline: Instant },
}

impl Expiry {
    fn expired(&self, now: Instant) -> bool {
        match self {
            Expiry::Never => false,
            Expiry::At(deadline) => now >= *deadline,
            Expiry::Sliding { deadline, .. } => now >= *deadline,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    bytes: Vec<u8>,
    expiry: Expiry,
}

/// In-memory [`CacheStore`] with TTL support and failure injection.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_removes: AtomicBool,
    reads: AtomicU64,
    writes: AtomicU64,
    removes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent reads fail with [`StoreError::Read`].
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    /// Make subsequent writes fail with [`StoreError::Write`].
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Make subsequent removes fail with [`StoreError::Remove`].
    pub fn fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::Relaxed);
    }

    /// Number of successful read operations.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Number of successful write operations.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Number of successful remove operations.
    pub fn remove_count(&self) -> u64 {
        self.removes.load(Ordering::Relaxed)
    }

    /// Whether a live (non-expired) entry exists for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        let now = Instant::now();
        match self.entries.read() {
            Ok(entries) => entries.get(key).is_some_and(|entry| !entry.expiry.expired(now)),
            Err(_) => false,
        }
    }

    /// Number of entries, including not-yet-purged expired ones.
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(StoreError::Read {
                key: key.to_string(),
                reason: "injected read failure".to_string(),
            });
        }

        let mut entries = self.entries.write().map_err(|_| StoreError::Read {
            key: key.to_string(),
            reason: "lock poisoned".to_string(),
        })?;

        self.reads.fetch_add(1, Ordering::Relaxed);
        let now = Instant::now();

        let Some(entry) = entries.get_mut(key) else {
            return Ok(None);
        };

        if entry.expiry.expired(now) {
            entries.remove(key);
            return Ok(None);
        }

        if let Expiry::Sliding { window, deadline } = &mut entry.expiry {
            *deadline = now + *window;
        }

        Ok(Some(entry.bytes.clone()))
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        expiration: Expiration,
    ) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Write {
                key: key.to_string(),
                reason: "injected write failure".to_string(),
            });
        }

        let now = Instant::now();
        let expiry = match expiration {
            Expiration::None => Expiry::Never,
            Expiration::Absolute(duration) => Expiry::At(now + duration),
            Expiration::Sliding(window) => Expiry::Sliding {
                window,
                deadline: now + window,
            },
        };

        let mut entries = self.entries.write().map_err(|_| StoreError::Write {
            key: key.to_string(),
            reason: "lock poisoned".to_string(),
        })?;

        self.writes.fetch_add(1, Ordering::Relaxed);
        entries.insert(key.to_string(), Entry { bytes: value, expiry });
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        if self.fail_removes.load(Ordering::Relaxed) {
            return Err(StoreError::Remove {
                key: key.to_string(),
                reason: "injected remove failure".to_string(),
            });
        }

        let mut entries = self.entries.write().map_err(|_| StoreError::Remove {
            key: key.to_string(),
            reason: "lock poisoned".to_string(),
        })?;

        self.removes.fetch_add(1, Ordering::Relaxed);
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryStore::new();
        store
            .set("k", b"v".to_vec(), Expiration::None)
            .await
            .expect("set");
        assert_eq!(store.get("k").await.expect("get"), Some(b"v".to_vec()));

        store.remove("k").await.expect("remove");
        assert_eq!(store.get("k").await.expect("get"), None);
    }

    #[tokio::test]
    async fn test_remove_absent_key_is_ok() {
        let store = MemoryStore::new();
        store.remove("missing").await.expect("remove");
    }

    #[tokio::test]
    async fn test_absolute_expiration() {
        let store = MemoryStore::new();
        store
            .set("k", b"v".to_vec(), Expiration::Absolute(Duration::from_millis(30)))
            .await
            .expect("set");

        assert!(store.get("k").await.expect("get").is_some());
        sleep(Duration::from_millis(60)).await;
        assert_eq!(store.get("k").await.expect("get"), None);
    }

    #[tokio::test]
    async fn test_sliding_expiration_extends_on_read() {
        let store = MemoryStore::new();
        store
            .set("k", b"v".to_vec(), Expiration::Sliding(Duration::from_millis(80)))
            .await
            .expect("set");

        // Keep touching the entry inside the window; it must stay alive
        // beyond the original deadline.
        for _ in 0..4 {
            sleep(Duration::from_millis(40)).await;
            assert!(store.get("k").await.expect("get").is_some());
        }

        // Once reads stop, the window lapses.
        sleep(Duration::from_millis(120)).await;
        assert_eq!(store.get("k").await.expect("get"), None);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryStore::new();

        store.fail_reads(true);
        assert!(matches!(
            store.get("k").await,
            Err(StoreError::Read { .. })
        ));
        store.fail_reads(false);

        store.fail_writes(true);
        assert!(matches!(
            store.set("k", b"v".to_vec(), Expiration::None).await,
            Err(StoreError::Write { .. })
        ));
        store.fail_writes(false);

        store.fail_removes(true);
        assert!(matches!(
            store.remove("k").await,
            Err(StoreError::Remove { .. })
        ));
    }
}
