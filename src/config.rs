//! Configuration Module
//!
//! Handles loading and managing Redis connection settings from environment variables.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Redis connection and client parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis server host
    pub host: String,
    /// Redis server port
    pub port: u16,
    /// Database index selected on connect
    pub database: u8,
    /// Optional password (AUTH)
    pub password: Option<String>,
    /// Use TLS (`rediss://`)
    pub ssl: bool,
    /// Prefix prepended to every key and hash key
    pub key_prefix: String,
    /// Timeout for establishing the initial connection
    pub connect_timeout: Duration,
    /// Permit administrative commands such as FLUSHDB
    pub allow_admin: bool,
}

impl RedisConfig {
    /// Creates a new RedisConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_HOST` - Server host (default: 127.0.0.1)
    /// - `REDIS_PORT` - Server port (default: 6379)
    /// - `REDIS_DATABASE` - Database index (default: 0)
    /// - `REDIS_PASSWORD` - Password (default: none)
    /// - `REDIS_SSL` - `true` to connect over TLS (default: false)
    /// - `REDIS_KEY_PREFIX` - Key namespace (default: empty)
    /// - `REDIS_CONNECT_TIMEOUT` - Connect timeout in seconds (default: 5)
    /// - `REDIS_ALLOW_ADMIN` - `true` to allow FLUSHDB (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("REDIS_HOST")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.host),
            port: parse_var("REDIS_PORT").unwrap_or(defaults.port),
            database: parse_var("REDIS_DATABASE").unwrap_or(defaults.database),
            password: env::var("REDIS_PASSWORD").ok().filter(|v| !v.is_empty()),
            ssl: parse_var("REDIS_SSL").unwrap_or(defaults.ssl),
            key_prefix: env::var("REDIS_KEY_PREFIX").unwrap_or(defaults.key_prefix),
            connect_timeout: parse_var("REDIS_CONNECT_TIMEOUT")
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            allow_admin: parse_var("REDIS_ALLOW_ADMIN").unwrap_or(defaults.allow_admin),
        }
    }

    /// Builds the connection URL understood by `redis::Client::open`.
    ///
    /// The password is percent-encoded, so reserved characters survive.
    pub fn build_url(&self) -> String {
        let scheme = if self.ssl { "rediss" } else { "redis" };
        match &self.password {
            Some(password) => format!(
                "{}://:{}@{}:{}/{}",
                scheme,
                urlencoding::encode(password),
                self.host,
                self.port,
                self.database
            ),
            None => format!("{}://{}:{}/{}", scheme, self.host, self.port, self.database),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            database: 0,
            password: None,
            ssl: false,
            key_prefix: String::new(),
            connect_timeout: Duration::from_secs(5),
            allow_admin: false,
        }
    }
}
