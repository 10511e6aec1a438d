//! Cache-aside wrapper for async data sources

use super::manager::CacheManager;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Function deriving a cache key from call arguments
pub type KeyFn<A> = Arc<dyn Fn(&A) -> String + Send + Sync>;

/// Where a [`WithCache`] gets its key from
pub enum CacheKeySource<A> {
    /// Same key for every call
    Fixed(String),
    /// Key computed from the call arguments
    Derived(KeyFn<A>),
}

impl<A> Clone for CacheKeySource<A> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(key) => Self::Fixed(key.clone()),
            Self::Derived(key_fn) => Self::Derived(Arc::clone(key_fn)),
        }
    }
}

/// A data source wrapped with cache-aside reads
///
/// ```ignore
/// let cached = WithCache::keyed_by(cache, |id: &i64| CacheKeyGenerator::entity("problem", id))
///     .ttl(Duration::from_secs(300));
/// let problem = cached.call(42, |id| repo.find_problem(id)).await?;
/// ```
pub struct WithCache<A> {
    cache: Arc<CacheManager>,
    key: CacheKeySource<A>,
    ttl: Option<Duration>,
}

impl<A> Clone for WithCache<A> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            key: self.key.clone(),
            ttl: self.ttl,
        }
    }
}

impl<A> WithCache<A> {
    /// Wrap with a fixed key
    pub fn new(cache: Arc<CacheManager>, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: CacheKeySource::Fixed(key.into()),
            ttl: None,
        }
    }

    /// Wrap with a key derived from the call arguments
    pub fn keyed_by<K>(cache: Arc<CacheManager>, key_fn: K) -> Self
    where
        K: Fn(&A) -> String + Send + Sync + 'static,
    {
        Self {
            cache,
            key: CacheKeySource::Derived(Arc::new(key_fn)),
            ttl: None,
        }
    }

    /// Override the manager's default TTL
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn key_for(&self, args: &A) -> String {
        match &self.key {
            CacheKeySource::Fixed(key) => key.clone(),
            CacheKeySource::Derived(key_fn) => key_fn(args),
        }
    }

    /// Serve from cache, or call `origin` and cache what it returns
    pub async fn call<T, E, F, Fut>(&self, args: A, origin: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = self.key_for(&args);
        cache_aside(&self.cache, &key, self.ttl, move || origin(args)).await
    }
}

pub(crate) async fn cache_aside<T, E, F, Fut>(
    cache: &CacheManager,
    key: &str,
    ttl: Option<Duration>,
    origin: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if let Some(cached) = cache.get::<T>(key).await {
        return Ok(cached);
    }

    let value = origin().await?;
    // A failed write is already logged by the manager; the caller still gets the value
    cache.set(key, &value, ttl).await;
    Ok(value)
}
