//! Cache-aside engine
//!
//! Read-through, write-through and fail-open orchestration for a single
//! method invocation. The engine holds no mutable state of its own: every
//! operation is a pure function of its inputs plus calls to the externally
//! synchronized backing store, so calls for different fingerprints proceed
//! fully in parallel. Concurrent misses on the same fingerprint are NOT
//! coalesced; each runs its own read-miss-compute-write sequence and last
//! write wins.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::join_all;
use recall_core::{
    CacheConfig, CacheKeyProvider, KeyArgument, KeyError, MethodCachePolicy, MethodIdentity,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::index::{index_key, KeyVariantIndex};
use crate::store::{read_entry, write_entry, CacheRead, CacheStore};

/// Error surfaced by [`MethodResultCache::get_or_create`].
///
/// Store failures never appear here: a broken cache degrades to always
/// recomputing, it does not break the wrapped operation.
#[derive(Debug, Error)]
pub enum GetOrCreateError<E> {
    /// Fingerprint construction failed. The call is not servable through the
    /// cache; the caller decides whether to bypass caching or abort.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The underlying computation failed. Propagated verbatim; caching never
    /// masks a genuine computation error.
    #[error(transparent)]
    Factory(E),
}

/// Method result cache.
///
/// Orchestrates one cache-aside round trip per invocation and keeps the
/// key-variant index current so [`crate::CacheInvalidator`] can later purge
/// a method's entries in bulk.
pub struct MethodResultCache<S: CacheStore> {
    config: Arc<CacheConfig>,
    keys: CacheKeyProvider,
    store: Arc<S>,
}

impl<S: CacheStore> MethodResultCache<S> {
    pub fn new(config: Arc<CacheConfig>, store: Arc<S>) -> Self {
        Self {
            keys: CacheKeyProvider::new(Arc::clone(&config)),
            config,
            store,
        }
    }

    /// The shared configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve the registered cache policy for a method.
    ///
    /// `None` means the method is not cacheable and must not be routed
    /// through [`Self::get_or_create`].
    pub fn policy_for(&self, identity: &MethodIdentity) -> Option<MethodCachePolicy> {
        self.config.policy_for(identity)
    }

    /// Return the cached result for this invocation, or compute, store and
    /// index it.
    ///
    /// The externally observed value always equals what `factory` would have
    /// returned; the cache only short-circuits recomputation of that exact
    /// value. On a hit the factory is never invoked. On a miss the factory's
    /// value is returned even when the subsequent store write fails; the
    /// key-variant index is only updated after a confirmed write.
    pub async fn get_or_create<T, E, F, Fut>(
        &self,
        identity: &MethodIdentity,
        arguments: &[KeyArgument],
        policy: &MethodCachePolicy,
        factory: F,
    ) -> Result<T, GetOrCreateError<E>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let fingerprint = self.keys.fingerprint(identity, arguments)?;

        match read_entry::<T, _>(self.store.as_ref(), &fingerprint).await {
            Ok(CacheRead::Hit(value)) => return Ok(value),
            Ok(CacheRead::Miss) => {}
            Err(e) => {
                tracing::warn!(key = %fingerprint, error = %e, "cache read failed, treating as miss");
            }
        }

        let value = factory().await.map_err(GetOrCreateError::Factory)?;

        let written = match write_entry(
            self.store.as_ref(),
            &fingerprint,
            &value,
            policy.expiration(),
        )
        .await
        {
            Ok(written) => written,
            Err(e) => {
                tracing::warn!(key = %fingerprint, error = %e, "cache write failed, returning uncached value");
                false
            }
        };

        if written {
            let index = KeyVariantIndex::new(self.store.as_ref());
            if let Err(e) = index.record(&identity.method_key(), &fingerprint).await {
                // The value itself is cached and servable; only bulk
                // invalidation completeness degrades until the entry's own
                // TTL lapses.
                tracing::warn!(key = %fingerprint, error = %e, "key-variant index update failed");
            }
        }

        Ok(value)
    }

    /// Remove every entry ever cached for `identity`. Best-effort: removal
    /// failures are logged and swallowed.
    ///
    /// When the key-variant index is present, every listed fingerprint is
    /// removed, plus the bare method key when it was not itself listed
    /// (covers the zero-argument case), plus the index entry itself. When
    /// the index was never recorded, only the bare method key can be
    /// reached; argument-qualified entries whose index update previously
    /// failed leak until their own TTL expires.
    pub async fn remove(&self, identity: &MethodIdentity) {
        if self.policy_for(identity).is_none() {
            return;
        }

        let method_key = identity.method_key();
        let index = KeyVariantIndex::new(self.store.as_ref());

        let variants = match index.variants(&method_key).await {
            Ok(read) => read,
            Err(e) => {
                tracing::warn!(key = %method_key, error = %e, "key-variant index read failed");
                CacheRead::Miss
            }
        };

        let mut removals: Vec<String> = Vec::new();
        match variants {
            CacheRead::Hit(fingerprints) => {
                let bare_listed = fingerprints.contains(&method_key);
                removals.extend(fingerprints);
                if !bare_listed {
                    removals.push(method_key.clone());
                }
                removals.push(index_key(&method_key));
            }
            CacheRead::Miss => {
                removals.push(method_key.clone());
            }
        }

        let results = join_all(removals.iter().map(|key| self.store.remove(key))).await;
        for (key, result) in removals.iter().zip(results) {
            if let Err(e) = result {
                tracing::warn!(key = %key, method = %method_key, error = %e, "cache removal failed");
            }
        }
    }
}
