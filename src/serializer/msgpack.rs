//! MessagePack Serializer
//!
//! Compact binary codec backed by rmp-serde.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Serializer;
use crate::error::{CacheError, Result};

/// MessagePack encoding of nil
const MSGPACK_NIL: u8 = 0xc0;

// == MessagePack Serializer ==
/// Stores values as MessagePack with named struct fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackSerializer;

impl Serializer for MsgPackSerializer {
    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        rmp_serde::to_vec_named(value).map_err(|e| {
            CacheError::Serialization(format!("MessagePack encoding failed: {}", e))
        })
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        rmp_serde::from_slice(bytes).map_err(|e| {
            CacheError::Serialization(format!("MessagePack decoding failed: {}", e))
        })
    }

    fn is_nil(&self, bytes: &[u8]) -> bool {
        bytes == [MSGPACK_NIL]
    }
}
