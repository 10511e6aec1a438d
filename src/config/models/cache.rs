//! Cache configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Which cache store backs the cache manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// In-process map, suitable for single-process deployments and tests
    #[default]
    Memory,
    /// Networked Redis instance shared between processes
    Redis,
}

impl CacheBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheBackend::Memory => "memory",
            CacheBackend::Redis => "redis",
        }
    }
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "in-memory" | "inmemory" => Ok(CacheBackend::Memory),
            "redis" => Ok(CacheBackend::Redis),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Store implementation to use
    #[serde(default)]
    pub backend: CacheBackend,
    /// Default entry TTL in seconds
    #[serde(default = "default_cache_ttl")]
    pub default_ttl: u64,
    /// Redis settings, used when `backend` is `redis`
    #[serde(default)]
    pub redis: RedisConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            default_ttl: default_cache_ttl(),
            redis: RedisConfig::default(),
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    /// Build from an environment lookup function
    ///
    /// A configured Redis endpoint (`REDIS_URL`, or `REDIS_HOST` with an
    /// optional `REDIS_PORT`) selects the Redis backend unless
    /// `CACHE_BACKEND` says otherwise.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let endpoint = lookup("REDIS_URL")
            .filter(|url| !url.is_empty())
            .or_else(|| {
                lookup("REDIS_HOST").filter(|host| !host.is_empty()).map(|host| {
                    let port = lookup("REDIS_PORT").unwrap_or_else(|| "6379".to_string());
                    format!("redis://{}:{}", host, port)
                })
            });

        if let Some(url) = endpoint {
            config.redis.url = url;
            config.backend = CacheBackend::Redis;
        }

        if let Some(backend) =
            parse_env::<CacheBackend>("CACHE_BACKEND", lookup("CACHE_BACKEND"))?
        {
            config.backend = backend;
        }
        if let Some(ttl) = parse_env("CACHE_DEFAULT_TTL", lookup("CACHE_DEFAULT_TTL"))? {
            config.default_ttl = ttl;
        }
        if let Some(timeout) =
            parse_env("REDIS_CONNECTION_TIMEOUT", lookup("REDIS_CONNECTION_TIMEOUT"))?
        {
            config.redis.connection_timeout = timeout;
        }

        Ok(config)
    }
}

/// Redis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis URL
    #[serde(default)]
    pub url: String,
    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            connection_timeout: default_connection_timeout(),
        }
    }
}

impl RedisConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.backend, CacheBackend::Memory);
        assert_eq!(config.default_ttl(), Duration::from_secs(3600));
        assert!(!config.redis.is_configured());
    }

    #[test]
    fn test_no_endpoint_means_memory() {
        let config = CacheConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.backend, CacheBackend::Memory);
    }

    #[test]
    fn test_redis_url_selects_redis() {
        let config =
            CacheConfig::from_lookup(lookup_from(&[("REDIS_URL", "redis://cache:6379")])).unwrap();
        assert_eq!(config.backend, CacheBackend::Redis);
        assert_eq!(config.redis.url, "redis://cache:6379");
    }

    #[test]
    fn test_redis_host_builds_url() {
        let config = CacheConfig::from_lookup(lookup_from(&[
            ("REDIS_HOST", "cache.internal"),
            ("REDIS_PORT", "6380"),
        ]))
        .unwrap();
        assert_eq!(config.backend, CacheBackend::Redis);
        assert_eq!(config.redis.url, "redis://cache.internal:6380");
    }

    #[test]
    fn test_explicit_backend_wins() {
        let config = CacheConfig::from_lookup(lookup_from(&[
            ("REDIS_URL", "redis://cache:6379"),
            ("CACHE_BACKEND", "memory"),
            ("CACHE_DEFAULT_TTL", "120"),
        ]))
        .unwrap();
        assert_eq!(config.backend, CacheBackend::Memory);
        assert_eq!(config.default_ttl, 120);
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("Redis".parse::<CacheBackend>(), Ok(CacheBackend::Redis));
        assert_eq!("in-memory".parse::<CacheBackend>(), Ok(CacheBackend::Memory));
        assert!("memcached".parse::<CacheBackend>().is_err());
    }

    #[test]
    fn test_cache_config_deserialization() {
        let yaml = "backend: redis\nredis:\n  url: redis://localhost:6379\n";
        let config: CacheConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.backend, CacheBackend::Redis);
        assert_eq!(config.default_ttl, 3600);
        assert_eq!(config.redis.connection_timeout, 5);
    }
}
