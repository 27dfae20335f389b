//! Per-method cache policies and expiration translation

use std::time::Duration;

/// Expiration instruction handed to the backing store on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// Cache until explicitly invalidated.
    None,
    /// Expire a fixed duration after the write.
    Absolute(Duration),
    /// Expire once the duration elapses without a read; each read resets the
    /// window.
    Sliding(Duration),
}

/// Per-method cache configuration.
///
/// Resolved once at registration time and immutable afterwards. A method
/// with no policy registered for it is not cacheable.
///
/// All expiration components defaulting to zero means the entry never
/// expires on its own and lives until explicitly invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MethodCachePolicy {
    /// Hours component of the expiration duration.
    pub expiration_hours: u32,
    /// Minutes component of the expiration duration.
    pub expiration_minutes: u32,
    /// Seconds component of the expiration duration.
    pub expiration_seconds: u32,
    /// Sliding expiration instead of absolute. Defaults to false.
    pub sliding_expiration: bool,
}

impl MethodCachePolicy {
    /// Policy with no expiration: cache until invalidated.
    pub const fn new() -> Self {
        Self {
            expiration_hours: 0,
            expiration_minutes: 0,
            expiration_seconds: 0,
            sliding_expiration: false,
        }
    }

    /// Policy with an absolute `hours:minutes:seconds` expiration.
    pub const fn with_expiration(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            expiration_hours: hours,
            expiration_minutes: minutes,
            expiration_seconds: seconds,
            sliding_expiration: false,
        }
    }

    /// Switch the policy to sliding expiration.
    pub const fn sliding(mut self) -> Self {
        self.sliding_expiration = true;
        self
    }

    /// Translate the declarative settings into a concrete store instruction.
    ///
    /// All components zero produces [`Expiration::None`]. Otherwise the
    /// combined duration is tagged sliding or absolute according to
    /// `sliding_expiration`.
    pub fn expiration(&self) -> Expiration {
        let duration = Duration::from_secs(
            u64::from(self.expiration_hours) * 3600
                + u64::from(self.expiration_minutes) * 60
                + u64::from(self.expiration_seconds),
        );

        if duration.is_zero() {
            Expiration::None
        } else if self.sliding_expiration {
            Expiration::Sliding(duration)
        } else {
            Expiration::Absolute(duration)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_components_mean_no_expiration() {
        assert_eq!(MethodCachePolicy::new().expiration(), Expiration::None);
        assert_eq!(MethodCachePolicy::default().expiration(), Expiration::None);
        // Sliding flag alone does not create an expiration.
        assert_eq!(
            MethodCachePolicy::new().sliding().expiration(),
            Expiration::None
        );
    }

    #[test]
    fn test_absolute_expiration() {
        let policy = MethodCachePolicy::with_expiration(6, 30, 10);
        let expected = Duration::from_secs(6 * 3600 + 30 * 60 + 10);
        assert_eq!(policy.expiration(), Expiration::Absolute(expected));
    }

    #[test]
    fn test_sliding_expiration() {
        let policy = MethodCachePolicy::with_expiration(6, 30, 10).sliding();
        let expected = Duration::from_secs(6 * 3600 + 30 * 60 + 10);
        assert_eq!(policy.expiration(), Expiration::Sliding(expected));
    }

    #[test]
    fn test_seconds_only() {
        let policy = MethodCachePolicy::with_expiration(0, 0, 45);
        assert_eq!(
            policy.expiration(),
            Expiration::Absolute(Duration::from_secs(45))
        );
    }
}
