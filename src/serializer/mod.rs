//! Serializer Module
//!
//! Pluggable codecs converting typed values to and from the byte strings stored in Redis.

mod json;
mod msgpack;

#[cfg(test)]
mod property_tests;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

pub use json::JsonSerializer;
pub use msgpack::MsgPackSerializer;

// == Serializer Trait ==
/// Stateless codec shared by every operation of a cache client.
///
/// Implementations must round-trip: anything passed through `serialize`
/// comes back equal from `deserialize`.
pub trait Serializer: Send + Sync + 'static {
    /// Encodes a value into its stored byte representation.
    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;

    /// Decodes a stored byte representation.
    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;

    /// Returns true when `bytes` is this codec's encoding of a null value.
    fn is_nil(&self, bytes: &[u8]) -> bool;

    /// Returns true when this codec decodes Redis's decimal integer text
    /// (as written by HINCRBY) back into the same integer.
    fn reads_integers_as_text(&self) -> bool {
        false
    }
}
