//! RECALL Store - Cache-Aside Orchestration
//!
//! The async store abstraction and everything that drives it: the typed
//! read/write helpers, the cache-aside engine ([`MethodResultCache`]), the
//! key-variant index enabling bulk invalidation on stores without key
//! enumeration, the invalidation orchestrator ([`CacheInvalidator`]) and an
//! in-memory reference backend.
//!
//! # Failure semantics
//!
//! A broken cache must never break the wrapped operation. Store read
//! failures read as misses, store write failures still return the computed
//! value, removal failures leave invalidation best-effort. Only fingerprint
//! construction errors and errors from the underlying computation itself
//! propagate to callers.

pub mod engine;
pub mod index;
pub mod invalidator;
pub mod memory;
pub mod store;

pub use engine::{GetOrCreateError, MethodResultCache};
pub use index::KeyVariantIndex;
pub use invalidator::CacheInvalidator;
pub use memory::MemoryStore;
pub use store::{read_entry, write_entry, CacheRead, CacheStore};
