//! Error types for the cache client
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache client.
///
/// Absent data (missing key, missing field, empty list) is never an error;
/// those outcomes are reported as `None`, empty collections or zero counts.
#[derive(Error, Debug)]
pub enum CacheError {
    /// An argument failed validation (empty key, expiry in the past)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A required value serialized to the codec's nil marker
    #[error("Argument cannot be null: {0}")]
    NullArgument(String),

    /// The serializer could not encode or decode a value
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The Redis client reported a failure (I/O, protocol, server error)
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The initial connection could not be established in time
    #[error("Connection error: {0}")]
    Connection(String),

    /// An administrative command was issued without `allow_admin`
    #[error("Administrative command refused: {0}")]
    AdminDisabled(String),

    /// The client has been disposed
    #[error("Cache client has been disposed")]
    Disposed,
}

impl CacheError {
    /// Returns true for caller mistakes that are raised before any round trip.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CacheError::InvalidArgument(_) | CacheError::NullArgument(_)
        )
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache client.
pub type Result<T> = std::result::Result<T, CacheError>;
