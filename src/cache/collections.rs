//! Set and List Operations
//!
//! Set membership and head-push / tail-pop list access on the async client.

use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::cache::keys::ensure_key;
use crate::cache::CacheClient;
use crate::error::{CacheError, Result};
use crate::serializer::Serializer;

impl<S: Serializer> CacheClient<S> {
    /// Serializes a required item, rejecting the codec's null encoding.
    pub(crate) fn serialize_required<T: Serialize + ?Sized>(
        &self,
        item: &T,
        what: &str,
    ) -> Result<Vec<u8>> {
        let bytes = self.serializer.serialize(item)?;
        if self.serializer.is_nil(&bytes) {
            return Err(CacheError::NullArgument(what.to_string()));
        }
        Ok(bytes)
    }

    // == Set Add ==
    /// Adds an item to the set under `set_key`.
    ///
    /// Returns true if the item was not already a member.
    pub async fn set_add<T: Serialize + ?Sized>(&self, set_key: &str, item: &T) -> Result<bool> {
        ensure_key(set_key, "set key")?;
        let bytes = self.serialize_required(item, "item")?;

        let mut conn = self.connection().await?;
        let added: i64 = conn.sadd(self.namespace.apply(set_key), bytes).await?;

        debug!("Added member to set '{}': {}", set_key, added > 0);
        Ok(added > 0)
    }

    // == Set Members ==
    /// Returns the raw (still serialized) members of a set.
    ///
    /// Members that are not valid UTF-8 are converted lossily.
    pub async fn set_member(&self, set_key: &str) -> Result<Vec<String>> {
        ensure_key(set_key, "set key")?;
        let mut conn = self.connection().await?;
        let members: Vec<Vec<u8>> = conn.smembers(self.namespace.apply(set_key)).await?;

        debug!("Set '{}' has {} members", set_key, members.len());
        Ok(members
            .iter()
            .map(|m| String::from_utf8_lossy(m).into_owned())
            .collect())
    }

    /// Returns the deserialized members of a set.
    pub async fn set_members<T: DeserializeOwned>(&self, set_key: &str) -> Result<Vec<T>> {
        ensure_key(set_key, "set key")?;
        let mut conn = self.connection().await?;
        let members: Vec<Vec<u8>> = conn.smembers(self.namespace.apply(set_key)).await?;

        members
            .iter()
            .map(|m| self.serializer.deserialize(m))
            .collect()
    }

    // == List Add To Left ==
    /// Pushes an item onto the head of the list; returns the new length.
    pub async fn list_add_to_left<T: Serialize + ?Sized>(
        &self,
        list_key: &str,
        item: &T,
    ) -> Result<i64> {
        ensure_key(list_key, "list key")?;
        let bytes = self.serialize_required(item, "item")?;

        let mut conn = self.connection().await?;
        let length: i64 = conn.lpush(self.namespace.apply(list_key), bytes).await?;

        debug!("Pushed onto list '{}', length now {}", list_key, length);
        Ok(length)
    }

    // == List Get From Right ==
    /// Pops and deserializes the tail of the list.
    ///
    /// Returns `None` when the list is empty or absent.
    pub async fn list_get_from_right<T: DeserializeOwned>(
        &self,
        list_key: &str,
    ) -> Result<Option<T>> {
        ensure_key(list_key, "list key")?;
        let mut conn = self.connection().await?;
        let raw: Option<Vec<u8>> = conn.rpop(self.namespace.apply(list_key), None).await?;

        debug!("Popped from list '{}': {}", list_key, raw.is_some());
        raw.map(|bytes| self.serializer.deserialize(&bytes))
            .transpose()
    }
}
