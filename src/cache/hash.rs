//! Hash Operations
//!
//! Field-level access to Redis hashes on the async client. Hash keys are
//! namespaced; field names are stored as given.

use std::collections::HashMap;

use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::cache::keys::ensure_key;
use crate::cache::CacheClient;
use crate::error::{CacheError, Result};
use crate::serializer::Serializer;

impl<S: Serializer> CacheClient<S> {
    // == Hash Set ==
    /// Writes one field of a hash.
    ///
    /// With `nx` set, the write only happens if the field is absent (HSETNX,
    /// atomic on the server) and `false` reports an existing field that was
    /// left untouched. Without `nx`, the field is overwritten and the result
    /// is always `true`.
    pub async fn hash_set<T: Serialize + ?Sized>(
        &self,
        hash_key: &str,
        field: &str,
        value: &T,
        nx: bool,
    ) -> Result<bool> {
        ensure_key(hash_key, "hash key")?;
        let bytes = self.serializer.serialize(value)?;
        let stored = self.namespace.apply(hash_key);
        let mut conn = self.connection().await?;

        let written = if nx {
            let inserted: bool = conn.hset_nx(stored, field, bytes).await?;
            inserted
        } else {
            let _: i64 = conn.hset(stored, field, bytes).await?;
            true
        };

        debug!(
            "Set field '{}' of hash '{}' (nx={}, written={})",
            field, hash_key, nx, written
        );
        Ok(written)
    }

    /// Writes several fields of a hash in one round trip.
    pub async fn hash_set_all<F, T>(&self, hash_key: &str, entries: &[(F, T)]) -> Result<()>
    where
        F: AsRef<str>,
        T: Serialize,
    {
        ensure_key(hash_key, "hash key")?;
        if entries.is_empty() {
            return Ok(());
        }

        let pairs = entries
            .iter()
            .map(|(field, value)| {
                let bytes = self.serializer.serialize(value)?;
                Ok((field.as_ref().to_string(), bytes))
            })
            .collect::<Result<Vec<(String, Vec<u8>)>>>()?;

        let mut conn = self.connection().await?;
        let _: () = conn
            .hset_multiple(self.namespace.apply(hash_key), &pairs)
            .await?;

        debug!("Set {} fields of hash '{}'", pairs.len(), hash_key);
        Ok(())
    }

    // == Hash Get ==
    /// Reads and deserializes one field; `None` when absent.
    pub async fn hash_get<T: DeserializeOwned>(
        &self,
        hash_key: &str,
        field: &str,
    ) -> Result<Option<T>> {
        ensure_key(hash_key, "hash key")?;
        let mut conn = self.connection().await?;
        let raw: Option<Vec<u8>> = conn.hget(self.namespace.apply(hash_key), field).await?;
        self.decode_lookup(&format!("field '{}' of hash '{}'", field, hash_key), raw)
    }

    /// Reads several fields in one round trip (HMGET).
    ///
    /// Only fields that exist appear in the result.
    pub async fn hash_get_many<F, T>(
        &self,
        hash_key: &str,
        fields: &[F],
    ) -> Result<HashMap<String, T>>
    where
        F: AsRef<str>,
        T: DeserializeOwned,
    {
        ensure_key(hash_key, "hash key")?;
        if fields.is_empty() {
            return Ok(HashMap::new());
        }

        let names: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
        let mut conn = self.connection().await?;
        let raw: Vec<Option<Vec<u8>>> = redis::cmd("HMGET")
            .arg(self.namespace.apply(hash_key))
            .arg(&names)
            .query_async(&mut conn)
            .await?;

        let mut found = HashMap::with_capacity(names.len());
        for (field, value) in names.into_iter().zip(raw) {
            let what = format!("field '{}' of hash '{}'", field, hash_key);
            if let Some(decoded) = self.decode_lookup(&what, value)? {
                found.insert(field.to_string(), decoded);
            }
        }
        Ok(found)
    }

    /// Reads every field of a hash.
    pub async fn hash_get_all<T: DeserializeOwned>(
        &self,
        hash_key: &str,
    ) -> Result<HashMap<String, T>> {
        ensure_key(hash_key, "hash key")?;
        let mut conn = self.connection().await?;
        let raw: HashMap<String, Vec<u8>> = conn.hgetall(self.namespace.apply(hash_key)).await?;

        debug!("Hash '{}' has {} fields", hash_key, raw.len());
        raw.into_iter()
            .map(|(field, bytes)| Ok((field, self.serializer.deserialize(&bytes)?)))
            .collect()
    }

    // == Hash Delete ==
    /// Deletes one field; returns whether it existed.
    pub async fn hash_delete(&self, hash_key: &str, field: &str) -> Result<bool> {
        Ok(self.hash_delete_many(hash_key, &[field]).await? > 0)
    }

    /// Deletes several fields; returns how many existed.
    pub async fn hash_delete_many<F: AsRef<str>>(
        &self,
        hash_key: &str,
        fields: &[F],
    ) -> Result<i64> {
        ensure_key(hash_key, "hash key")?;
        if fields.is_empty() {
            return Ok(0);
        }

        let names: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
        let mut conn = self.connection().await?;
        let deleted: i64 = conn.hdel(self.namespace.apply(hash_key), &names).await?;

        debug!(
            "Deleted {} of {} fields from hash '{}'",
            deleted,
            names.len(),
            hash_key
        );
        Ok(deleted)
    }

    // == Hash Exists ==
    /// Returns whether `field` exists in the hash.
    pub async fn hash_exists(&self, hash_key: &str, field: &str) -> Result<bool> {
        ensure_key(hash_key, "hash key")?;
        let mut conn = self.connection().await?;
        let exists: bool = conn.hexists(self.namespace.apply(hash_key), field).await?;
        Ok(exists)
    }

    // == Hash Keys ==
    /// Returns every field name; empty when the hash is absent.
    pub async fn hash_keys(&self, hash_key: &str) -> Result<Vec<String>> {
        ensure_key(hash_key, "hash key")?;
        let mut conn = self.connection().await?;
        let fields: Vec<String> = conn.hkeys(self.namespace.apply(hash_key)).await?;
        Ok(fields)
    }

    // == Hash Values ==
    /// Returns every deserialized field value.
    pub async fn hash_values<T: DeserializeOwned>(&self, hash_key: &str) -> Result<Vec<T>> {
        ensure_key(hash_key, "hash key")?;
        let mut conn = self.connection().await?;
        let values: Vec<Vec<u8>> = conn.hvals(self.namespace.apply(hash_key)).await?;

        values
            .iter()
            .map(|bytes| self.serializer.deserialize(bytes))
            .collect()
    }

    // == Hash Length ==
    /// Returns the number of fields; 0 when the hash is absent.
    pub async fn hash_length(&self, hash_key: &str) -> Result<i64> {
        ensure_key(hash_key, "hash key")?;
        let mut conn = self.connection().await?;
        let length: i64 = conn.hlen(self.namespace.apply(hash_key)).await?;
        Ok(length)
    }

    // == Hash Increment ==
    /// Adds `delta` to an integer field, creating it at 0 first if absent.
    ///
    /// The server stores the result as decimal text, so this is only
    /// available when the serializer reads that text back as the same
    /// integer. Other codecs get `InvalidArgument` before any round trip.
    pub async fn hash_increment_by(
        &self,
        hash_key: &str,
        field: &str,
        delta: i64,
    ) -> Result<i64> {
        ensure_key(hash_key, "hash key")?;
        if !self.serializer.reads_integers_as_text() {
            return Err(CacheError::InvalidArgument(
                "hash_increment_by requires a serializer that reads integers as text".to_string(),
            ));
        }
        let mut conn = self.connection().await?;
        let value: i64 = conn.hincr(self.namespace.apply(hash_key), field, delta).await?;

        debug!(
            "Incremented field '{}' of hash '{}' to {}",
            field, hash_key, value
        );
        Ok(value)
    }
}
