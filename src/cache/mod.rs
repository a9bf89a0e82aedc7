//! Cache Module
//!
//! Typed cache client mapping application values onto Redis strings, sets,
//! lists, hashes and pub/sub channels.

mod client;
mod collections;
mod expiry;
mod hash;
mod info;
mod keys;
mod pubsub;
mod stats;


// Re-export public types
pub use client::CacheClient;
pub use expiry::Expiry;
pub use info::parse_info;
pub use keys::KeyNamespace;
pub use stats::CacheStats;

pub(crate) use stats::StatsRecorder;
