//! Redis Cache Client - A typed cache facade over Redis
//!
//! Maps typed operations onto Redis strings, sets, lists, hashes, key search
//! and pub/sub, converting values through a pluggable serializer.
//!
//! The async [`CacheClient`] is the primary interface; [`blocking::CacheClient`]
//! offers the same operations for synchronous callers.

pub mod blocking;
pub mod cache;
pub mod config;
pub mod error;
pub mod serializer;
pub mod tasks;

pub use cache::{CacheClient, CacheStats, Expiry};
pub use config::RedisConfig;
pub use error::{CacheError, Result};
pub use serializer::{JsonSerializer, MsgPackSerializer, Serializer};
pub use tasks::Subscription;
