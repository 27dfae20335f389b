//! Deterministic cache key construction
//!
//! A fingerprint has the shape `method_key[-suffix][-argument_hash]`. The
//! method key comes from the static [`MethodIdentity`], the suffix from the
//! configured provider, and the argument hash is a hex SHA-256 digest over
//! the canonical JSON encoding of the resolved argument sequence.
//! `serde_json` keeps map fields in sorted order and encodes enum variants
//! by name, so the encoding is stable across builds and across reordering
//! of enum members.

use std::sync::Arc;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::argument::KeyArgument;
use crate::config::CacheConfig;
use crate::error::KeyError;
use crate::identity::MethodIdentity;

/// Builds deterministic store keys from method identities and captured
/// arguments.
///
/// Pure apart from reading the shared configuration; no I/O.
#[derive(Clone)]
pub struct CacheKeyProvider {
    config: Arc<CacheConfig>,
}

impl CacheKeyProvider {
    pub fn new(config: Arc<CacheConfig>) -> Self {
        Self { config }
    }

    /// Root key for a method, independent of arguments and suffix.
    pub fn method_key(&self, identity: &MethodIdentity) -> String {
        identity.method_key()
    }

    /// Full fingerprint for one invocation.
    ///
    /// Two calls with the same method, same suffix and argument lists that
    /// canonicalize identically produce the same fingerprint. Arguments
    /// whose type is in the ignore set never participate; when no argument
    /// survives filtering there is no hash component at all.
    pub fn fingerprint(
        &self,
        identity: &MethodIdentity,
        arguments: &[KeyArgument],
    ) -> Result<String, KeyError> {
        let mut key = identity.method_key();

        if let Some(suffix) = self.config.key_suffix() {
            key.push('-');
            key.push_str(&suffix);
        }

        let resolved: Vec<Value> = arguments
            .iter()
            .filter(|argument| !self.config.is_ignored(argument.type_name()))
            .map(|argument| argument.resolved(self.config.argument_resolver()))
            .collect();

        if resolved.is_empty() {
            return Ok(key);
        }

        let encoded = serde_json::to_vec(&resolved)?;
        let hash = hex::encode(Sha256::digest(&encoded));

        key.push('-');
        key.push_str(&hash);
        Ok(key)
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::argument::IntoKeyArgument;
    use proptest::prelude::*;

    fn capture(values: &[i64]) -> Vec<KeyArgument> {
        values
            .iter()
            .map(|v| KeyArgument::scalar(v).expect("scalar capture"))
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// The same argument vector always produces the same fingerprint.
        #[test]
        fn prop_fingerprint_deterministic(values in proptest::collection::vec(any::<i64>(), 0..8)) {
            let keys = CacheKeyProvider::new(Arc::new(CacheConfig::builder().build()));
            let identity = MethodIdentity::new("svc::Users", "get_first_name");

            let a = keys.fingerprint(&identity, &capture(&values)).expect("fingerprint");
            let b = keys.fingerprint(&identity, &capture(&values)).expect("fingerprint");
            prop_assert_eq!(a, b);
        }

        /// Distinct argument vectors produce distinct fingerprints.
        #[test]
        fn prop_distinct_arguments_do_not_collide(
            a in proptest::collection::vec(any::<i64>(), 1..8),
            b in proptest::collection::vec(any::<i64>(), 1..8),
        ) {
            prop_assume!(a != b);
            let keys = CacheKeyProvider::new(Arc::new(CacheConfig::builder().build()));
            let identity = MethodIdentity::new("svc::Users", "get_first_name");

            let fa = keys.fingerprint(&identity, &capture(&a)).expect("fingerprint");
            let fb = keys.fingerprint(&identity, &capture(&b)).expect("fingerprint");
            prop_assert_ne!(fa, fb);
        }

        /// Mixed scalar types with equal textual content stay distinct: the
        /// canonical encoding is typed JSON, so 1 and "1" differ.
        #[test]
        fn prop_number_and_string_arguments_differ(n in any::<i64>()) {
            let keys = CacheKeyProvider::new(Arc::new(CacheConfig::builder().build()));
            let identity = MethodIdentity::new("svc::Users", "get_first_name");

            let as_number = vec![n.into_key_argument().expect("capture")];
            let as_string = vec![n.to_string().into_key_argument().expect("capture")];

            let fa = keys.fingerprint(&identity, &as_number).expect("fingerprint");
            let fb = keys.fingerprint(&identity, &as_string).expect("fingerprint");
            prop_assert_ne!(fa, fb);
        }
    }
}
