//! Async key-value store abstraction and typed entry helpers

use async_trait::async_trait;
use recall_core::{Expiration, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Asynchronous key-value store consumed by the caching engine.
///
/// Implementations are external collaborators (Redis, Memcached, a database
/// table, ...). The engine assumes nothing beyond UTF-8 string keys, opaque
/// byte payloads and optional per-entry expiration; synchronization and
/// timeout policy are the store's responsibility.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read the raw payload for `key`, or `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write `value` under `key` with the given expiration instruction.
    async fn set(&self, key: &str, value: Vec<u8>, expiration: Expiration)
        -> Result<(), StoreError>;

    /// Remove the entry for `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Read-side result: a decoded hit or a miss.
///
/// A legitimately cached default/empty value is still a `Hit`; the two
/// outcomes never conflate because absence is carried by the discriminant,
/// not by the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheRead<T> {
    Hit(T),
    Miss,
}

impl<T> CacheRead<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheRead::Hit(_))
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            CacheRead::Hit(value) => Some(value),
            CacheRead::Miss => None,
        }
    }
}

/// Read and decode a typed entry.
///
/// Absent and empty payloads both read as [`CacheRead::Miss`]; a present
/// payload that fails to decode is a [`StoreError::Decode`].
pub async fn read_entry<T, S>(store: &S, key: &str) -> Result<CacheRead<T>, StoreError>
where
    T: DeserializeOwned,
    S: CacheStore + ?Sized,
{
    let Some(bytes) = store.get(key).await? else {
        return Ok(CacheRead::Miss);
    };

    if bytes.is_empty() {
        return Ok(CacheRead::Miss);
    }

    let value = serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode {
        key: key.to_string(),
        reason: e.to_string(),
    })?;

    Ok(CacheRead::Hit(value))
}

/// Encode and write a typed entry.
///
/// Returns whether the write was confirmed. An empty encoded payload is
/// never written, since it would later read as a miss.
pub async fn write_entry<T, S>(
    store: &S,
    key: &str,
    value: &T,
    expiration: Expiration,
) -> Result<bool, StoreError>
where
    T: Serialize,
    S: CacheStore + ?Sized,
{
    let bytes = serde_json::to_vec(value).map_err(|e| StoreError::Encode {
        key: key.to_string(),
        reason: e.to_string(),
    })?;

    if bytes.is_empty() {
        return Ok(false);
    }

    store.set(key, bytes, expiration).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn test_absent_key_reads_as_miss() {
        let store = MemoryStore::new();
        let read: CacheRead<String> = read_entry(&store, "missing").await.expect("read");
        assert_eq!(read, CacheRead::Miss);
    }

    #[tokio::test]
    async fn test_round_trip_hit() {
        let store = MemoryStore::new();
        let written = write_entry(&store, "k", &"John Smith".to_string(), Expiration::None)
            .await
            .expect("write");
        assert!(written);

        let read: CacheRead<String> = read_entry(&store, "k").await.expect("read");
        assert_eq!(read, CacheRead::Hit("John Smith".to_string()));
    }

    #[tokio::test]
    async fn test_cached_empty_value_is_still_a_hit() {
        let store = MemoryStore::new();
        write_entry(&store, "k", &String::new(), Expiration::None)
            .await
            .expect("write");

        let read: CacheRead<String> = read_entry(&store, "k").await.expect("read");
        assert_eq!(read, CacheRead::Hit(String::new()));
    }

    #[tokio::test]
    async fn test_undecodable_payload_is_a_decode_error() {
        let store = MemoryStore::new();
        store
            .set("k", b"not json".to_vec(), Expiration::None)
            .await
            .expect("set");

        let result: Result<CacheRead<u32>, _> = read_entry(&store, "k").await;
        assert!(matches!(result, Err(StoreError::Decode { .. })));
    }
}
