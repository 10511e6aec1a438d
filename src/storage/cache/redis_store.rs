//! Redis-backed cache store

use super::pattern;
use super::store::CacheStore;
use crate::config::{CacheBackend, RedisConfig};
use crate::utils::error::{DataError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};

/// Keys requested per `SCAN` round trip
const SCAN_BATCH_SIZE: usize = 500;

/// Cache store talking to a Redis server over a multiplexed connection
#[derive(Clone)]
pub struct RedisCacheStore {
    connection: MultiplexedConnection,
    url: String,
}

impl std::fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheStore")
            .field("url", &self.url)
            .finish()
    }
}

impl RedisCacheStore {
    /// Connect and verify the server answers `PING`
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let url = Self::sanitize_url(&config.url);
        info!("Connecting to Redis cache store");
        debug!("Redis URL: {}", url);

        let client = Client::open(config.url.as_str())?;
        let connection = tokio::time::timeout(
            Duration::from_secs(config.connection_timeout),
            client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| {
            DataError::timeout(format!(
                "Redis connection not established within {}s",
                config.connection_timeout
            ))
        })??;

        let store = Self { connection, url };
        store.health_check().await?;

        info!("Redis cache store ready");
        Ok(store)
    }

    /// Check that the server responds
    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.connection.clone();
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        if reply != "PONG" {
            return Err(DataError::cache(format!("Unexpected PING reply: {}", reply)));
        }
        Ok(())
    }

    /// Connection URL with the password masked
    pub fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn sanitize_url(url: &str) -> String {
        match url::Url::parse(url) {
            Ok(mut parsed) => {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("***"));
                }
                parsed.to_string()
            }
            Err(_) => "invalid_url".to_string(),
        }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let mut conn = self.connection.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, key: &str, ttl_seconds: u64, value: Bytes) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.set_ex(key, value.as_ref(), ttl_seconds).await?;
        Ok(())
    }

    async fn del(&self, keys: &[String]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.connection.clone();
        let removed: u64 = conn.del(keys).await?;
        Ok(removed)
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        // SCAN instead of KEYS so large keyspaces do not block the server
        let glob = pattern::escape_for_redis(pattern);
        let mut conn = self.connection.clone();
        let mut cursor: u64 = 0;
        let mut found = HashSet::new();

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&glob)
                .arg("COUNT")
                .arg(SCAN_BATCH_SIZE)
                .query_async(&mut conn)
                .await?;

            found.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(found.into_iter().collect())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection.clone();
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        let mut conn = self.connection.clone();
        let ttl: i64 = conn.ttl(key).await?;
        Ok(ttl)
    }

    fn backend(&self) -> CacheBackend {
        CacheBackend::Redis
    }
}
