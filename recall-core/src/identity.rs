//! Method identity types

use std::fmt;

/// Prefix shared by every cache key the engine produces.
pub const METHOD_KEY_PREFIX: &str = "method_result_cache_";

/// Stable identifier of a cacheable operation: declaring service plus method
/// name.
///
/// Both components come from static metadata supplied at registration time,
/// never from instance state, so the same logical method maps to the same
/// key across calls and process restarts. This identity is the root of both
/// the cache key and the key-variant index key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodIdentity {
    service: &'static str,
    method: &'static str,
}

impl MethodIdentity {
    /// Create an identity from a fully qualified service name and a method
    /// name.
    pub const fn new(service: &'static str, method: &'static str) -> Self {
        Self { service, method }
    }

    /// The fully qualified service name.
    pub const fn service(&self) -> &'static str {
        self.service
    }

    /// The method name.
    pub const fn method(&self) -> &'static str {
        self.method
    }

    /// Root cache key for this method, independent of arguments and suffix:
    /// `method_result_cache_{service}.{method}`.
    pub fn method_key(&self) -> String {
        format!("{METHOD_KEY_PREFIX}{}.{}", self.service, self.method)
    }
}

impl fmt::Display for MethodIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.service, self.method)
    }
}
