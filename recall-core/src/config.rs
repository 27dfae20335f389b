//! Process-wide cache configuration and service registration
//!
//! All of this is assembled once through [`CacheConfigBuilder`] before the
//! first cached call and is read-only afterwards. Components receive the
//! finished [`CacheConfig`] behind an `Arc`; there is no mutable global
//! state.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;

use crate::argument::Cancellation;
use crate::error::ConfigError;
use crate::identity::MethodIdentity;
use crate::policy::MethodCachePolicy;

/// Replaces an argument value in the canonical encoding.
///
/// Called with the argument's runtime type name and its canonical serde
/// encoding; returning `None` keeps the original value.
pub type ArgumentResolver = dyn Fn(&str, &Value) -> Option<Value> + Send + Sync;

/// Supplies the optional global key suffix, e.g. an environment
/// discriminator. Blank suffixes are treated as absent.
pub type KeySuffixProvider = dyn Fn() -> Option<String> + Send + Sync;

/// Static description of a service and the methods the interception seam is
/// able to redirect.
///
/// This is the registration-table stand-in for runtime reflection: the seam
/// declares up front which methods exist and are interceptable, and
/// registration validates requested method names against it at setup time.
#[derive(Debug, Clone, Copy)]
pub struct ServiceDescriptor {
    /// Fully qualified service name.
    pub service: &'static str,
    /// Interceptable method names.
    pub methods: &'static [&'static str],
}

impl ServiceDescriptor {
    pub const fn new(service: &'static str, methods: &'static [&'static str]) -> Self {
        Self { service, methods }
    }

    /// Identity of one of this service's methods.
    pub const fn identity(&self, method: &'static str) -> MethodIdentity {
        MethodIdentity::new(self.service, method)
    }
}

#[derive(Clone, Copy)]
struct RegisteredPolicy {
    policy: MethodCachePolicy,
    // Explicit per-method registration wins over service-wide registration
    // regardless of call order.
    explicit: bool,
}

/// Immutable, process-wide cache configuration: the per-method policy
/// registry, the fingerprint ignore set, the optional argument resolver and
/// the optional key suffix provider.
pub struct CacheConfig {
    policies: HashMap<&'static str, HashMap<&'static str, MethodCachePolicy>>,
    ignore_types: HashSet<&'static str>,
    argument_resolver: Option<Arc<ArgumentResolver>>,
    key_suffix: Option<Arc<KeySuffixProvider>>,
}

impl CacheConfig {
    /// Start building a configuration.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::new()
    }

    /// Resolve the cache policy for a method.
    ///
    /// `None` means the method is not cacheable.
    pub fn policy_for(&self, identity: &MethodIdentity) -> Option<MethodCachePolicy> {
        self.policies
            .get(identity.service())?
            .get(identity.method())
            .copied()
    }

    /// Identities of every method registered with a cache policy for the
    /// given service.
    pub fn cached_methods(&self, service: &str) -> Vec<MethodIdentity> {
        // The registry keys borrow from 'static descriptors, so identities
        // can be rebuilt from them directly.
        match self.policies.get_key_value(service) {
            Some((&service, methods)) => methods
                .keys()
                .map(|&method| MethodIdentity::new(service, method))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Whether arguments of the given runtime type are excluded from
    /// fingerprints.
    pub fn is_ignored(&self, type_name: &str) -> bool {
        self.ignore_types.contains(type_name)
    }

    pub(crate) fn argument_resolver(&self) -> Option<&ArgumentResolver> {
        self.argument_resolver.as_deref()
    }

    pub(crate) fn key_suffix(&self) -> Option<String> {
        let provider = self.key_suffix.as_deref()?;
        provider().filter(|suffix| !suffix.trim().is_empty())
    }
}

/// Builder for [`CacheConfig`].
pub struct CacheConfigBuilder {
    policies: HashMap<&'static str, HashMap<&'static str, RegisteredPolicy>>,
    ignore_types: HashSet<&'static str>,
    argument_resolver: Option<Arc<ArgumentResolver>>,
    key_suffix: Option<Arc<KeySuffixProvider>>,
}

impl CacheConfigBuilder {
    pub fn new() -> Self {
        let mut ignore_types = HashSet::new();
        ignore_types.insert(Cancellation::type_name());

        Self {
            policies: HashMap::new(),
            ignore_types,
            argument_resolver: None,
            key_suffix: None,
        }
    }

    /// Register one policy for every interceptable method of a service.
    ///
    /// Methods later registered individually through [`Self::cache_method`]
    /// keep their explicit policy.
    pub fn cache_service(
        mut self,
        descriptor: ServiceDescriptor,
        policy: MethodCachePolicy,
    ) -> Self {
        let methods = self.policies.entry(descriptor.service).or_default();
        for &method in descriptor.methods {
            methods
                .entry(method)
                .and_modify(|registered| {
                    if !registered.explicit {
                        registered.policy = policy;
                    }
                })
                .or_insert(RegisteredPolicy {
                    policy,
                    explicit: false,
                });
        }
        self
    }

    /// Register a policy for a single method.
    ///
    /// Fails at setup time when the method is not declared on the
    /// descriptor, so misconfiguration never waits for the first call to
    /// surface.
    pub fn cache_method(
        mut self,
        descriptor: ServiceDescriptor,
        method: &'static str,
        policy: MethodCachePolicy,
    ) -> Result<Self, ConfigError> {
        if !descriptor.methods.contains(&method) {
            return Err(ConfigError::UnknownMethod {
                service: descriptor.service,
                method,
            });
        }

        self.policies.entry(descriptor.service).or_default().insert(
            method,
            RegisteredPolicy {
                policy,
                explicit: true,
            },
        );
        Ok(self)
    }

    /// Exclude arguments of the given runtime type name from fingerprints.
    pub fn ignore_type(mut self, type_name: &'static str) -> Self {
        self.ignore_types.insert(type_name);
        self
    }

    /// Exclude arguments of type `T` from fingerprints.
    pub fn ignore<T>(self) -> Self {
        self.ignore_type(std::any::type_name::<T>())
    }

    /// Set the argument resolver consulted before canonical encoding.
    pub fn argument_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str, &Value) -> Option<Value> + Send + Sync + 'static,
    {
        self.argument_resolver = Some(Arc::new(resolver));
        self
    }

    /// Set the global key suffix provider.
    pub fn key_suffix<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        self.key_suffix = Some(Arc::new(provider));
        self
    }

    /// Finish the configuration.
    pub fn build(self) -> CacheConfig {
        let policies = self
            .policies
            .into_iter()
            .map(|(service, methods)| {
                let methods = methods
                    .into_iter()
                    .map(|(method, registered)| (method, registered.policy))
                    .collect();
                (service, methods)
            })
            .collect();

        CacheConfig {
            policies,
            ignore_types: self.ignore_types,
            argument_resolver: self.argument_resolver,
            key_suffix: self.key_suffix,
        }
    }
}

impl Default for CacheConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
