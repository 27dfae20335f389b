//! RECALL Core - Method-Result Cache Types
//!
//! Pure types and pure functions for the RECALL caching engine: method
//! identities, per-method cache policies, argument capture, deterministic
//! fingerprinting and the process-wide configuration surface. No I/O lives
//! here; the async store abstraction and the cache-aside orchestration are
//! in `recall-store`.

pub mod argument;
pub mod config;
pub mod error;
pub mod identity;
pub mod key;
pub mod policy;

pub use argument::{Cancellation, IntoKeyArgument, KeyArgument};
pub use config::{
    ArgumentResolver, CacheConfig, CacheConfigBuilder, KeySuffixProvider, ServiceDescriptor,
};
pub use error::{ConfigError, KeyError, StoreError};
pub use identity::{MethodIdentity, METHOD_KEY_PREFIX};
pub use key::CacheKeyProvider;
pub use policy::{Expiration, MethodCachePolicy};
