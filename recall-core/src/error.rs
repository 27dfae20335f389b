//! Error types for RECALL operations

use thiserror::Error;

/// Setup-time configuration errors.
///
/// These are fatal and surface from registration, never at first call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Method '{method}' does not exist on service '{service}'")]
    UnknownMethod {
        service: &'static str,
        method: &'static str,
    },
}

/// Fingerprint construction errors.
///
/// Never swallowed: a wrong or missing key would corrupt caching semantics,
/// so the caller must decide whether to bypass caching or abort.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Failed to encode argument for cache key: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Backing store errors.
///
/// Treated as transient infrastructure failures: the engine logs them and
/// fails open (a read failure is a miss, a write failure still returns the
/// computed value, a remove failure leaves invalidation best-effort).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Read failed for key '{key}': {reason}")]
    Read { key: String, reason: String },

    #[error("Write failed for key '{key}': {reason}")]
    Write { key: String, reason: String },

    #[error("Remove failed for key '{key}': {reason}")]
    Remove { key: String, reason: String },

    #[error("Failed to decode cached payload for key '{key}': {reason}")]
    Decode { key: String, reason: String },

    #[error("Failed to encode payload for key '{key}': {reason}")]
    Encode { key: String, reason: String },
}
