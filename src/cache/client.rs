//! Cache Client Module
//!
//! Connection lifecycle plus string and key-space operations of the async client.
//! Set, list, hash and pub/sub operations live in sibling modules as further
//! `impl` blocks on the same type.

use std::collections::HashMap;
use std::sync::Arc;

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::AbortHandle;
use tracing::{debug, info};

use crate::cache::keys::{ensure_key, ensure_keys};
use crate::cache::{parse_info, CacheStats, Expiry, KeyNamespace, StatsRecorder};
use crate::config::RedisConfig;
use crate::error::{CacheError, Result};
use crate::serializer::{JsonSerializer, Serializer};

// == Cache Client ==
/// Typed facade over one Redis database.
///
/// Every operation is a single round trip on a shared multiplexed connection,
/// so one client can be used concurrently from many tasks (wrap it in an
/// `Arc` to share it). Values go through the injected [`Serializer`].
///
/// Once [`dispose`](CacheClient::dispose) has run, every operation fails with
/// [`CacheError::Disposed`].
pub struct CacheClient<S: Serializer = JsonSerializer> {
    /// Client used to open dedicated pub/sub connections
    pub(crate) client: Client,
    /// Shared connection, `None` once disposed
    connection: RwLock<Option<ConnectionManager>>,
    pub(crate) serializer: Arc<S>,
    pub(crate) namespace: KeyNamespace,
    allow_admin: bool,
    pub(crate) stats: StatsRecorder,
    /// Listener tasks started by `subscribe`
    pub(crate) subscriptions: Mutex<Vec<AbortHandle>>,
}

impl CacheClient<JsonSerializer> {
    /// Connects using the JSON serializer.
    pub async fn connect_json(config: &RedisConfig) -> Result<Self> {
        Self::connect(config, JsonSerializer).await
    }
}

impl<S: Serializer> CacheClient<S> {
    // == Constructor ==
    /// Connects to the Redis database described by `config`.
    ///
    /// Fails with [`CacheError::Connection`] if the server does not answer
    /// within `config.connect_timeout`.
    pub async fn connect(config: &RedisConfig, serializer: S) -> Result<Self> {
        info!(
            "Connecting to Redis at {}:{} (db {})",
            config.host, config.port, config.database
        );

        let client = Client::open(config.build_url())?;
        let manager = tokio::time::timeout(
            config.connect_timeout,
            ConnectionManager::new(client.clone()),
        )
        .await
        .map_err(|_| {
            CacheError::Connection(format!(
                "Timed out after {:?} connecting to {}:{}",
                config.connect_timeout, config.host, config.port
            ))
        })??;

        info!("Redis connection established");

        Ok(Self {
            client,
            connection: RwLock::new(Some(manager)),
            serializer: Arc::new(serializer),
            namespace: KeyNamespace::new(config.key_prefix.clone()),
            allow_admin: config.allow_admin,
            stats: StatsRecorder::default(),
            subscriptions: Mutex::new(Vec::new()),
        })
    }

    /// Returns a handle on the shared connection.
    pub(crate) async fn connection(&self) -> Result<ConnectionManager> {
        self.connection
            .read()
            .await
            .clone()
            .ok_or(CacheError::Disposed)
    }

    // == Accessors ==
    /// Returns the serializer used for every value.
    pub fn serializer(&self) -> &S {
        &self.serializer
    }

    /// Returns the key namespace applied to every key.
    pub fn namespace(&self) -> &KeyNamespace {
        &self.namespace
    }

    /// Returns client-side hit/miss counters for typed reads.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    // == Lifecycle ==
    /// Returns true once `dispose` has been called.
    pub async fn is_disposed(&self) -> bool {
        self.connection.read().await.is_none()
    }

    /// Releases the connection and cancels every subscription.
    ///
    /// Calling it again is a no-op.
    pub async fn dispose(&self) {
        let released = self.connection.write().await.take();
        let cancelled = self.unsubscribe_all().await;
        if released.is_some() {
            info!(
                "Cache client disposed ({} subscriptions cancelled)",
                cancelled
            );
        }
    }

    /// Decodes an optional stored value, counting the lookup.
    pub(crate) fn decode_lookup<T: DeserializeOwned>(
        &self,
        what: &str,
        raw: Option<Vec<u8>>,
    ) -> Result<Option<T>> {
        self.stats.record(raw.is_some());
        match raw {
            Some(bytes) => {
                debug!("Cache hit for {}", what);
                Ok(Some(self.serializer.deserialize(&bytes)?))
            }
            None => {
                debug!("Cache miss for {}", what);
                Ok(None)
            }
        }
    }

    // == Add ==
    /// Stores a value under `key`, overwriting any previous value.
    ///
    /// Returns whether Redis acknowledged the write.
    pub async fn add<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<bool> {
        self.add_with_expiry(key, value, Expiry::Never).await
    }

    /// Stores a value under `key` with the given lifetime.
    pub async fn add_with_expiry<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        expiry: Expiry,
    ) -> Result<bool> {
        ensure_key(key, "key")?;
        let ttl_ms = expiry.ttl_ms()?;
        let bytes = self.serializer.serialize(value)?;
        self.store(key, bytes, ttl_ms, false).await
    }

    // == Replace ==
    /// Overwrites the value under `key` only if the key already exists.
    pub async fn replace<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<bool> {
        self.replace_with_expiry(key, value, Expiry::Never).await
    }

    /// Overwrites an existing key and resets its lifetime.
    pub async fn replace_with_expiry<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        expiry: Expiry,
    ) -> Result<bool> {
        ensure_key(key, "key")?;
        let ttl_ms = expiry.ttl_ms()?;
        let bytes = self.serializer.serialize(value)?;
        self.store(key, bytes, ttl_ms, true).await
    }

    async fn store(
        &self,
        key: &str,
        bytes: Vec<u8>,
        ttl_ms: Option<u64>,
        only_existing: bool,
    ) -> Result<bool> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(self.namespace.apply(key)).arg(bytes);
        if let Some(ms) = ttl_ms {
            cmd.arg("PX").arg(ms);
        }
        if only_existing {
            cmd.arg("XX");
        }

        let mut conn = self.connection().await?;
        // OK on success, nil when the XX condition was not met
        let reply: Option<String> = cmd.query_async(&mut conn).await?;

        debug!(
            "Stored key '{}' (ttl_ms={:?}, written={})",
            key,
            ttl_ms,
            reply.is_some()
        );
        Ok(reply.is_some())
    }

    // == Add All ==
    /// Stores several values in one round trip (MSET).
    ///
    /// An empty batch succeeds without contacting the server.
    pub async fn add_all<K, T>(&self, items: &[(K, T)]) -> Result<bool>
    where
        K: AsRef<str>,
        T: Serialize,
    {
        for (key, _) in items {
            ensure_key(key.as_ref(), "key")?;
        }
        if items.is_empty() {
            return Ok(true);
        }

        let mut cmd = redis::cmd("MSET");
        for (key, value) in items {
            cmd.arg(self.namespace.apply(key.as_ref()))
                .arg(self.serializer.serialize(value)?);
        }

        let mut conn = self.connection().await?;
        let reply: Option<String> = cmd.query_async(&mut conn).await?;

        debug!("Stored {} keys in one batch", items.len());
        Ok(reply.is_some())
    }

    // == Get ==
    /// Retrieves and deserializes the value under `key`.
    ///
    /// Returns `None` when the key does not exist.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        ensure_key(key, "key")?;
        let mut conn = self.connection().await?;
        let raw: Option<Vec<u8>> = conn.get(self.namespace.apply(key)).await?;
        self.decode_lookup(&format!("key '{}'", key), raw)
    }

    // == Get All ==
    /// Retrieves several keys in one round trip (MGET).
    ///
    /// Every requested key appears in the result; absent keys map to `None`.
    pub async fn get_all<K, T>(&self, keys: &[K]) -> Result<HashMap<String, Option<T>>>
    where
        K: AsRef<str>,
        T: DeserializeOwned,
    {
        ensure_keys(keys, "key")?;
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let mut conn = self.connection().await?;
        let raw: Vec<Option<Vec<u8>>> = redis::cmd("MGET")
            .arg(self.namespace.apply_all(keys))
            .query_async(&mut conn)
            .await?;

        keys.iter()
            .zip(raw)
            .map(|(key, value)| {
                let key = key.as_ref();
                let decoded = self.decode_lookup(&format!("key '{}'", key), value)?;
                Ok((key.to_string(), decoded))
            })
            .collect()
    }

    // == Remove ==
    /// Deletes `key`; returns whether it existed.
    pub async fn remove(&self, key: &str) -> Result<bool> {
        ensure_key(key, "key")?;
        let mut conn = self.connection().await?;
        let deleted: i64 = conn.del(self.namespace.apply(key)).await?;

        debug!("Deleted key '{}': {}", key, deleted > 0);
        Ok(deleted > 0)
    }

    /// Deletes several keys in one round trip. Absent keys are ignored.
    pub async fn remove_all<K: AsRef<str>>(&self, keys: &[K]) -> Result<()> {
        ensure_keys(keys, "key")?;
        if keys.is_empty() {
            return Ok(());
        }

        let mut conn = self.connection().await?;
        let deleted: i64 = conn.del(self.namespace.apply_all(keys)).await?;

        debug!("Deleted {} of {} keys", deleted, keys.len());
        Ok(())
    }

    // == Exists ==
    /// Returns whether `key` exists.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        ensure_key(key, "key")?;
        let mut conn = self.connection().await?;
        let exists: bool = conn.exists(self.namespace.apply(key)).await?;
        Ok(exists)
    }

    // == Update Expiry ==
    /// Resets the lifetime of an existing key.
    ///
    /// Returns `false` when the key does not exist. `Expiry::Never` removes
    /// any TTL from the key.
    pub async fn update_expiry(&self, key: &str, expiry: Expiry) -> Result<bool> {
        ensure_key(key, "key")?;
        let ttl_ms = expiry.ttl_ms()?;
        let stored = self.namespace.apply(key);
        let mut conn = self.connection().await?;

        let updated = match ttl_ms {
            Some(ms) => {
                let changed: bool = redis::cmd("PEXPIRE")
                    .arg(&stored)
                    .arg(ms)
                    .query_async(&mut conn)
                    .await?;
                changed
            }
            None => {
                // PERSIST alone cannot tell "absent" from "had no TTL"
                let (exists,): (bool,) = redis::pipe()
                    .atomic()
                    .cmd("EXISTS")
                    .arg(&stored)
                    .cmd("PERSIST")
                    .arg(&stored)
                    .ignore()
                    .query_async(&mut conn)
                    .await?;
                exists
            }
        };

        debug!("Updated expiry of key '{}': {}", key, updated);
        Ok(updated)
    }

    // == Search Keys ==
    /// Lists every key matching a glob pattern (`*`, `?`, `[...]`).
    ///
    /// Uses KEYS, a full scan of the database: intended for diagnostics and
    /// tests, not hot paths. Returned keys have the namespace removed.
    pub async fn search_keys(&self, pattern: &str) -> Result<Vec<String>> {
        ensure_key(pattern, "pattern")?;
        let mut conn = self.connection().await?;
        let stored: Vec<String> = redis::cmd("KEYS")
            .arg(self.namespace.apply_pattern(pattern))
            .query_async(&mut conn)
            .await?;

        debug!("Pattern '{}' matched {} keys", pattern, stored.len());
        Ok(stored.iter().map(|key| self.namespace.strip(key)).collect())
    }

    // == Flush ==
    /// Removes every key of the active database.
    ///
    /// Refused unless the configuration sets `allow_admin`.
    pub async fn flush_db(&self) -> Result<()> {
        if !self.allow_admin {
            return Err(CacheError::AdminDisabled(
                "FLUSHDB requires allow_admin".to_string(),
            ));
        }
        let mut conn = self.connection().await?;
        let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;

        info!("Flushed active database");
        Ok(())
    }

    // == Info ==
    /// Returns the server's INFO fields as a flat map.
    pub async fn get_info(&self) -> Result<HashMap<String, String>> {
        let mut conn = self.connection().await?;
        let raw: String = redis::cmd("INFO").query_async(&mut conn).await?;
        let info = parse_info(&raw);

        debug!("Fetched {} INFO fields", info.len());
        Ok(info)
    }
}

// Verify Send + Sync bounds so clients can be shared across tasks
fn _assert_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    assert_send::<CacheClient>();
    assert_sync::<CacheClient>();
}
