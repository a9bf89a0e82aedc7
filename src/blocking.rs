//! Blocking Client
//!
//! Synchronous counterpart of [`crate::cache::CacheClient`] with identical
//! semantics, for callers that are not running inside an async runtime.
//! Each method blocks on the async method of the same name.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::runtime::{Builder, Runtime};

use crate::cache::{self, CacheStats, Expiry, KeyNamespace};
use crate::config::RedisConfig;
use crate::error::{CacheError, Result};
use crate::serializer::{JsonSerializer, Serializer};
use crate::tasks::Subscription;

// == Blocking Cache Client ==
/// Blocking facade driving an async client on a private runtime.
///
/// The runtime has one worker thread; the shared connection and every
/// subscription handler run there. Creating, using or dropping this client
/// from inside an async context panics, as with any nested tokio runtime.
pub struct CacheClient<S: Serializer = JsonSerializer> {
    // Declared before `runtime` so the connection is released first on drop
    inner: cache::CacheClient<S>,
    runtime: Runtime,
}

impl CacheClient<JsonSerializer> {
    /// Connects using the JSON serializer.
    pub fn connect_json(config: &RedisConfig) -> Result<Self> {
        Self::connect(config, JsonSerializer)
    }
}

impl<S: Serializer> CacheClient<S> {
    // == Constructor ==
    /// Starts the private runtime and connects to Redis.
    pub fn connect(config: &RedisConfig, serializer: S) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("redis-cache-client")
            .enable_all()
            .build()
            .map_err(|e| CacheError::Connection(format!("Failed to start runtime: {}", e)))?;

        let inner = runtime.block_on(cache::CacheClient::connect(config, serializer))?;
        Ok(Self { inner, runtime })
    }

    /// Returns the async client this facade drives.
    pub fn as_async(&self) -> &cache::CacheClient<S> {
        &self.inner
    }

    /// Returns the serializer shared by every operation.
    pub fn serializer(&self) -> &S {
        self.inner.serializer()
    }

    /// Returns the key namespace applied to keys and hash keys.
    pub fn namespace(&self) -> &KeyNamespace {
        self.inner.namespace()
    }

    /// Returns a snapshot of the hit and miss counters.
    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }

    // == Lifecycle ==
    /// Returns whether `dispose` has run.
    pub fn is_disposed(&self) -> bool {
        self.runtime.block_on(self.inner.is_disposed())
    }

    /// Releases the connection and cancels every subscription.
    pub fn dispose(&self) {
        self.runtime.block_on(self.inner.dispose())
    }

    // == Strings and keys ==
    /// Stores a value under `key`, overwriting any existing value.
    pub fn add<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<bool> {
        self.runtime.block_on(self.inner.add(key, value))
    }

    /// Stores a value that expires according to `expiry`.
    pub fn add_with_expiry<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        expiry: Expiry,
    ) -> Result<bool> {
        self.runtime
            .block_on(self.inner.add_with_expiry(key, value, expiry))
    }

    /// Overwrites an existing key; `false` when the key is absent.
    pub fn replace<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<bool> {
        self.runtime.block_on(self.inner.replace(key, value))
    }

    /// Overwrites an existing key and sets its expiry.
    pub fn replace_with_expiry<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        expiry: Expiry,
    ) -> Result<bool> {
        self.runtime
            .block_on(self.inner.replace_with_expiry(key, value, expiry))
    }

    /// Stores several values in one round trip.
    pub fn add_all<K, T>(&self, items: &[(K, T)]) -> Result<bool>
    where
        K: AsRef<str>,
        T: Serialize,
    {
        self.runtime.block_on(self.inner.add_all(items))
    }

    /// Reads and deserializes a value; `None` when absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.runtime.block_on(self.inner.get(key))
    }

    /// Reads several keys in one round trip, keyed by the requested key.
    pub fn get_all<K, T>(&self, keys: &[K]) -> Result<HashMap<String, Option<T>>>
    where
        K: AsRef<str>,
        T: DeserializeOwned,
    {
        self.runtime.block_on(self.inner.get_all(keys))
    }

    /// Deletes a key; returns whether it existed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        self.runtime.block_on(self.inner.remove(key))
    }

    /// Deletes several keys in one round trip.
    pub fn remove_all<K: AsRef<str>>(&self, keys: &[K]) -> Result<()> {
        self.runtime.block_on(self.inner.remove_all(keys))
    }

    /// Returns whether `key` exists.
    pub fn exists(&self, key: &str) -> Result<bool> {
        self.runtime.block_on(self.inner.exists(key))
    }

    /// Changes the expiry of an existing key.
    pub fn update_expiry(&self, key: &str, expiry: Expiry) -> Result<bool> {
        self.runtime.block_on(self.inner.update_expiry(key, expiry))
    }

    /// Returns the keys matching a glob pattern within the namespace.
    pub fn search_keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.runtime.block_on(self.inner.search_keys(pattern))
    }

    /// Deletes every key in the database; requires `allow_admin`.
    pub fn flush_db(&self) -> Result<()> {
        self.runtime.block_on(self.inner.flush_db())
    }

    /// Returns the server INFO fields.
    pub fn get_info(&self) -> Result<HashMap<String, String>> {
        self.runtime.block_on(self.inner.get_info())
    }

    // == Sets and lists ==
    /// Adds an item to a set; returns true if it was not already a member.
    pub fn set_add<T: Serialize + ?Sized>(&self, set_key: &str, item: &T) -> Result<bool> {
        self.runtime.block_on(self.inner.set_add(set_key, item))
    }

    /// Returns the raw members of a set as strings.
    pub fn set_member(&self, set_key: &str) -> Result<Vec<String>> {
        self.runtime.block_on(self.inner.set_member(set_key))
    }

    /// Returns the deserialized members of a set.
    pub fn set_members<T: DeserializeOwned>(&self, set_key: &str) -> Result<Vec<T>> {
        self.runtime.block_on(self.inner.set_members(set_key))
    }

    /// Pushes an item onto the head of a list; returns the new length.
    pub fn list_add_to_left<T: Serialize + ?Sized>(&self, list_key: &str, item: &T) -> Result<i64> {
        self.runtime
            .block_on(self.inner.list_add_to_left(list_key, item))
    }

    /// Pops the tail of a list; `None` when empty.
    pub fn list_get_from_right<T: DeserializeOwned>(&self, list_key: &str) -> Result<Option<T>> {
        self.runtime.block_on(self.inner.list_get_from_right(list_key))
    }

    // == Hashes ==
    /// Writes one field of a hash, only when absent if `nx` is set.
    pub fn hash_set<T: Serialize + ?Sized>(
        &self,
        hash_key: &str,
        field: &str,
        value: &T,
        nx: bool,
    ) -> Result<bool> {
        self.runtime
            .block_on(self.inner.hash_set(hash_key, field, value, nx))
    }

    /// Writes several fields of a hash in one round trip.
    pub fn hash_set_all<F, T>(&self, hash_key: &str, entries: &[(F, T)]) -> Result<()>
    where
        F: AsRef<str>,
        T: Serialize,
    {
        self.runtime
            .block_on(self.inner.hash_set_all(hash_key, entries))
    }

    /// Reads one field of a hash; `None` when absent.
    pub fn hash_get<T: DeserializeOwned>(&self, hash_key: &str, field: &str) -> Result<Option<T>> {
        self.runtime.block_on(self.inner.hash_get(hash_key, field))
    }

    /// Reads several fields of a hash; absent fields are left out.
    pub fn hash_get_many<F, T>(&self, hash_key: &str, fields: &[F]) -> Result<HashMap<String, T>>
    where
        F: AsRef<str>,
        T: DeserializeOwned,
    {
        self.runtime
            .block_on(self.inner.hash_get_many(hash_key, fields))
    }

    /// Reads every field of a hash.
    pub fn hash_get_all<T: DeserializeOwned>(&self, hash_key: &str) -> Result<HashMap<String, T>> {
        self.runtime.block_on(self.inner.hash_get_all(hash_key))
    }

    /// Deletes one field; returns whether it existed.
    pub fn hash_delete(&self, hash_key: &str, field: &str) -> Result<bool> {
        self.runtime.block_on(self.inner.hash_delete(hash_key, field))
    }

    /// Deletes several fields; returns how many existed.
    pub fn hash_delete_many<F: AsRef<str>>(&self, hash_key: &str, fields: &[F]) -> Result<i64> {
        self.runtime
            .block_on(self.inner.hash_delete_many(hash_key, fields))
    }

    /// Returns whether `field` exists in the hash.
    pub fn hash_exists(&self, hash_key: &str, field: &str) -> Result<bool> {
        self.runtime.block_on(self.inner.hash_exists(hash_key, field))
    }

    /// Returns every field name of a hash.
    pub fn hash_keys(&self, hash_key: &str) -> Result<Vec<String>> {
        self.runtime.block_on(self.inner.hash_keys(hash_key))
    }

    /// Returns every deserialized field value of a hash.
    pub fn hash_values<T: DeserializeOwned>(&self, hash_key: &str) -> Result<Vec<T>> {
        self.runtime.block_on(self.inner.hash_values(hash_key))
    }

    /// Returns the number of fields in a hash.
    pub fn hash_length(&self, hash_key: &str) -> Result<i64> {
        self.runtime.block_on(self.inner.hash_length(hash_key))
    }

    /// Adds `delta` to an integer field; JSON clients only.
    pub fn hash_increment_by(&self, hash_key: &str, field: &str, delta: i64) -> Result<i64> {
        self.runtime
            .block_on(self.inner.hash_increment_by(hash_key, field, delta))
    }

    // == Pub/Sub ==
    /// Publishes a message; returns how many subscribers received it.
    pub fn publish<T: Serialize + ?Sized>(&self, channel: &str, message: &T) -> Result<i64> {
        self.runtime.block_on(self.inner.publish(channel, message))
    }

    /// Registers `handler` for `channel`; it runs on the runtime's worker thread.
    pub fn subscribe<T, F>(&self, channel: &str, handler: F) -> Result<Subscription>
    where
        T: DeserializeOwned + Send + 'static,
        F: Fn(T) + Send + 'static,
    {
        self.runtime.block_on(self.inner.subscribe(channel, handler))
    }

    /// Returns how many subscriptions are still running.
    pub fn subscription_count(&self) -> usize {
        self.runtime.block_on(self.inner.subscription_count())
    }

    /// Cancels every subscription; returns how many were running.
    pub fn unsubscribe_all(&self) -> usize {
        self.runtime.block_on(self.inner.unsubscribe_all())
    }
}
