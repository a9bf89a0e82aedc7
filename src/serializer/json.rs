//! JSON Serializer
//!
//! Default codec backed by serde_json.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Serializer;
use crate::error::{CacheError, Result};

// == JSON Serializer ==
/// Stores values as UTF-8 JSON documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value)
            .map_err(|e| CacheError::Serialization(format!("JSON encoding failed: {}", e)))
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes)
            .map_err(|e| CacheError::Serialization(format!("JSON decoding failed: {}", e)))
    }

    fn is_nil(&self, bytes: &[u8]) -> bool {
        bytes == b"null"
    }

    fn reads_integers_as_text(&self) -> bool {
        true
    }
}
