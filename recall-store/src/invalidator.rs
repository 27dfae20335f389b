//! Invalidation orchestrator
//!
//! Public entry point mapping "a method" or "all methods of a service" to
//! key-variant index lookups and removals. Invalidation is best-effort by
//! design: removal failures are logged and swallowed, never propagated.

use std::sync::Arc;

use futures_util::future::join_all;
use recall_core::MethodIdentity;

use crate::engine::MethodResultCache;
use crate::store::CacheStore;

/// Cache invalidator.
pub struct CacheInvalidator<S: CacheStore> {
    cache: Arc<MethodResultCache<S>>,
}

impl<S: CacheStore> CacheInvalidator<S> {
    pub fn new(cache: Arc<MethodResultCache<S>>) -> Self {
        Self { cache }
    }

    /// Invalidate every cached result for a single method.
    pub async fn invalidate_method(&self, identity: &MethodIdentity) {
        self.cache.remove(identity).await;
    }

    /// Invalidate every cached result for every registered method of a
    /// service.
    ///
    /// Iterates the policy registry, so methods without a cache policy are
    /// naturally skipped. Per-method removals run concurrently and are
    /// awaited jointly.
    pub async fn invalidate_service(&self, service: &str) {
        let identities = self.cache.config().cached_methods(service);
        join_all(
            identities
                .iter()
                .map(|identity| self.cache.remove(identity)),
        )
        .await;
    }
}
