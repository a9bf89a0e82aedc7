//! Shared helpers for integration tests
//!
//! Each test gets its own Redis container through testcontainers. Setting
//! `REDIS_HOST` (with `REDIS_PORT`, ...) runs against that server instead.

#![allow(dead_code)]

use std::env;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use redis_cache_client::{blocking, CacheClient, CacheError, RedisConfig, Serializer};
use serde::{Deserialize, Serialize};
use testcontainers::{clients::Cli, Container, RunnableImage};
use testcontainers_modules::redis::Redis;

// == Test Data ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestClass<T> {
    pub key: String,
    pub value: T,
}

impl<T> TestClass<T> {
    pub fn new(key: impl Into<String>, value: T) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

// == Helper Functions ==
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redis_cache_client=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Builds a config whose key prefix is unique to this test invocation.
pub fn test_config(scope: &str) -> RedisConfig {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);

    RedisConfig {
        key_prefix: format!("it:{}:{}:{}:", scope, nanos, n),
        ..RedisConfig::from_env()
    }
}

// == Redis Server ==
/// A connected client plus the container serving it, if one was started.
///
/// Fields drop in order, so the client disconnects before the container stops.
pub struct TestRedis<C> {
    pub client: C,
    pub container: Option<Container<'static, Redis>>,
}

impl<C> Deref for TestRedis<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.client
    }
}

/// Resolves the server for one test.
///
/// `REDIS_HOST` points the tests at an existing server; otherwise a fresh
/// Redis container is started. Either way a missing server fails the test.
fn provision(scope: &str) -> (RedisConfig, Option<Container<'static, Redis>>) {
    init_tracing();
    let mut config = test_config(scope);
    if env::var("REDIS_HOST").map(|v| !v.is_empty()).unwrap_or(false) {
        return (config, None);
    }

    // Leaked so the container can outlive this frame
    let docker: &'static Cli = Box::leak(Box::new(Cli::default()));
    let container = docker.run(RunnableImage::from(Redis::default()));
    config.host = "127.0.0.1".to_string();
    config.port = container.get_host_port_ipv4(6379);
    config.password = None;
    config.ssl = false;
    (config, Some(container))
}

fn unreachable_server(scope: &str, config: &RedisConfig, err: CacheError) -> ! {
    panic!(
        "{}: cannot reach Redis at {}:{}: {}",
        scope, config.host, config.port, err
    )
}

/// Connects an async client, panicking when no server can be reached.
pub async fn connect<S: Serializer>(scope: &str, serializer: S) -> TestRedis<CacheClient<S>> {
    let (config, container) = provision(scope);
    let client = CacheClient::connect(&config, serializer)
        .await
        .unwrap_or_else(|e| unreachable_server(scope, &config, e));
    TestRedis { client, container }
}

/// Connects a blocking client, panicking when no server can be reached.
pub fn connect_blocking<S: Serializer>(
    scope: &str,
    serializer: S,
) -> TestRedis<blocking::CacheClient<S>> {
    let (config, container) = provision(scope);
    let client = blocking::CacheClient::connect(&config, serializer)
        .unwrap_or_else(|e| unreachable_server(scope, &config, e));
    TestRedis { client, container }
}

/// Removes every key created under the client's namespace.
pub async fn cleanup<S: Serializer>(client: &CacheClient<S>) {
    if let Ok(keys) = client.search_keys("*").await {
        let _ = client.remove_all(&keys).await;
    }
}

/// Evaluates to a connected client fixture for the test scope.
#[allow(unused_macros)]
macro_rules! test_client {
    ($scope:expr) => {
        test_client!($scope, redis_cache_client::JsonSerializer)
    };
    ($scope:expr, $serializer:expr) => {
        common::connect($scope, $serializer).await
    };
}
