//! Expiry Module
//!
//! Defines when a stored value should expire and converts it to a Redis TTL.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{CacheError, Result};

// == Expiry ==
/// Lifetime requested for a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiry {
    /// The value never expires
    #[default]
    Never,
    /// The value expires after the given duration
    In(Duration),
    /// The value expires at the given instant
    At(DateTime<Utc>),
}

impl Expiry {
    // == Time To Live ==
    /// Returns the TTL in milliseconds, or None if no expiration is set.
    ///
    /// A zero duration or an instant that is not in the future is rejected,
    /// since Redis would either refuse it or drop the value immediately.
    pub fn ttl_ms(&self) -> Result<Option<u64>> {
        self.ttl_ms_at(Utc::now())
    }

    fn ttl_ms_at(&self, now: DateTime<Utc>) -> Result<Option<u64>> {
        match self {
            Expiry::Never => Ok(None),
            Expiry::In(duration) => {
                let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
                if ms == 0 {
                    return Err(CacheError::InvalidArgument(
                        "Expiry duration must be at least one millisecond".to_string(),
                    ));
                }
                Ok(Some(ms))
            }
            Expiry::At(at) => {
                let remaining = at.signed_duration_since(now).num_milliseconds();
                if remaining <= 0 {
                    return Err(CacheError::InvalidArgument(format!(
                        "Expiry {} is not in the future",
                        at.to_rfc3339()
                    )));
                }
                Ok(Some(remaining as u64))
            }
        }
    }
}

impl From<Duration> for Expiry {
    fn from(duration: Duration) -> Self {
        Expiry::In(duration)
    }
}

impl From<DateTime<Utc>> for Expiry {
    fn from(at: DateTime<Utc>) -> Self {
        Expiry::At(at)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_has_no_ttl() {
        assert_eq!(Expiry::Never.ttl_ms().unwrap(), None);
        assert_eq!(Expiry::default(), Expiry::Never);
    }

    #[test]
    fn test_relative_ttl_in_ms() {
        let expiry = Expiry::from(Duration::from_secs(10));
        assert_eq!(expiry.ttl_ms().unwrap(), Some(10_000));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let result = Expiry::In(Duration::ZERO).ttl_ms();
        assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
    }

    #[test]
    fn test_absolute_ttl_remaining() {
        let now = Utc::now();
        let expiry = Expiry::At(now + chrono::Duration::seconds(30));
        assert_eq!(expiry.ttl_ms_at(now).unwrap(), Some(30_000));
    }

    #[test]
    fn test_absolute_ttl_boundary_condition() {
        // An instant equal to now has nothing left to live
        let now = Utc::now();
        let result = Expiry::At(now).ttl_ms_at(now);
        assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
    }

    #[test]
    fn test_absolute_ttl_in_past_rejected() {
        let expiry = Expiry::from(Utc::now() - chrono::Duration::minutes(1));
        assert!(expiry.ttl_ms().is_err());
    }
}
