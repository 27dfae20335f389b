//! Key-variant index
//!
//! A key-value store offers no key enumeration, so "invalidate everything
//! ever cached for method M" needs a secondary index: one store entry per
//! method listing every fingerprint variant ever successfully written for
//! it. The entry is created lazily on the first confirmed value write,
//! grows but never shrinks, and is deleted together with its members on
//! invalidation.

use std::collections::HashSet;

use recall_core::{Expiration, StoreError};

use crate::store::{read_entry, write_entry, CacheRead, CacheStore};

/// Store key under which a method's fingerprint variants are indexed.
pub fn index_key(method_key: &str) -> String {
    format!("{method_key}_keys")
}

/// Per-method registry of every fingerprint ever written.
pub struct KeyVariantIndex<'a, S: CacheStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: CacheStore + ?Sized> KeyVariantIndex<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Add `fingerprint` to the variant set for `method_key`.
    ///
    /// Reads the current set (a miss is an empty set), inserts the
    /// fingerprint and writes back only if the set actually grew; a
    /// fingerprint already present skips the write entirely. Index entries
    /// never expire on their own.
    pub async fn record(&self, method_key: &str, fingerprint: &str) -> Result<(), StoreError> {
        let key = index_key(method_key);

        let mut variants: HashSet<String> = read_entry(self.store, &key)
            .await?
            .into_value()
            .unwrap_or_default();

        if !variants.insert(fingerprint.to_string()) {
            return Ok(());
        }

        write_entry(self.store, &key, &variants, Expiration::None).await?;
        Ok(())
    }

    /// Read the variant set for `method_key`.
    ///
    /// Side-effect free. [`CacheRead::Miss`] means no confirmed write was
    /// ever indexed for the method; the invalidation orchestrator decides
    /// what that implies.
    pub async fn variants(
        &self,
        method_key: &str,
    ) -> Result<CacheRead<HashSet<String>>, StoreError> {
        read_entry(self.store, &index_key(method_key)).await
    }
}
