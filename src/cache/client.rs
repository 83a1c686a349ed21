//! Cache-backed request client.
//!
//! [`CachedClient`] sits in front of an abstract [`RequestFetcher`]:
//!
//! - reads (`GET`) are served from a [`TtlCache`] when fresh; misses are
//!   de-duplicated and the fetched payload is cached once
//! - writes are de-duplicated and, on success, invalidate cached reads of the
//!   same resource
//!
//! Each resource carries an invalidation generation. A read captures it before
//! fetching and only caches its payload if no write landed in between, so a
//! read that overlapped a write can never put pre-write data back. Reads
//! started after a write also de-duplicate under the new generation and do
//! not join a read that began before it.
//!
//! The client does not know the wire format; it only needs the request identity
//! to derive keys and a payload or failure back from the fetcher.

use super::dedup::RequestDeduplicator;
use super::errors::CacheResult;
use super::key::CacheKey;
use super::ttl_cache::TtlCache;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    pub fn is_read(&self) -> bool {
        matches!(self, Self::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of an outbound API request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub resource: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, resource: impl Into<String>) -> Self {
        Self {
            method,
            resource: resource.into(),
            params: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(resource: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, resource)
    }

    pub fn post(resource: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, resource).with_body(body)
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Key under which a read of this request is cached
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::for_resource(&self.resource, &self.params)
    }

    /// Key under which this request is de-duplicated while in flight
    pub fn dedup_key(&self) -> CacheKey {
        CacheKey::for_request(
            self.method.as_str(),
            &self.resource,
            &self.params,
            self.body.as_ref(),
        )
    }
}

/// Performs a request against the platform API.
///
/// Bearer tokens, transport and timeouts are the implementor's concern; a
/// timeout should surface as [`super::CacheError::Timeout`].
#[async_trait]
pub trait RequestFetcher: Send + Sync + 'static {
    async fn fetch(&self, request: &ApiRequest) -> CacheResult<Value>;
}

pub struct CachedClient<F: RequestFetcher> {
    fetcher: Arc<F>,
    cache: Arc<TtlCache<Value>>,
    dedup: RequestDeduplicator<Value>,
    /// Invalidation generation per resource
    generations: Arc<DashMap<String, u64>>,
}

impl<F: RequestFetcher> CachedClient<F> {
    pub fn new(fetcher: Arc<F>, cache: Arc<TtlCache<Value>>) -> Self {
        Self {
            fetcher,
            cache,
            dedup: RequestDeduplicator::new(),
            generations: Arc::new(DashMap::new()),
        }
    }

    pub fn cache(&self) -> &Arc<TtlCache<Value>> {
        &self.cache
    }

    /// Perform `request`, going through the cache for reads
    pub async fn request(&self, request: &ApiRequest) -> CacheResult<Value> {
        if request.method.is_read() {
            self.read(request).await
        } else {
            self.write(request).await
        }
    }

    /// Drop cached reads of `resource` (any parameter set).
    ///
    /// Reads of `resource` still in flight will not cache their payload.
    pub fn invalidate_resource(&self, resource: &str) -> usize {
        *self.generations.entry(resource.to_string()).or_insert(0) += 1;
        let query_prefix = format!("{resource}?");
        self.cache
            .delete_where(|key| key == resource || key.starts_with(&query_prefix))
    }

    async fn read(&self, request: &ApiRequest) -> CacheResult<Value> {
        let cache_key = request.cache_key().into_string();
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached);
        }

        let generation = *self
            .generations
            .entry(request.resource.clone())
            .or_insert(0);
        let dedup_key = format!("{}@{generation}", request.dedup_key());

        let fetcher = Arc::clone(&self.fetcher);
        let cache = Arc::clone(&self.cache);
        let generations = Arc::clone(&self.generations);
        let owned = request.clone();
        self.dedup
            .dedupe(&dedup_key, move || async move {
                let payload = fetcher.fetch(&owned).await?;
                // Holding the generation entry keeps an invalidation from
                // slipping between the check and the insert
                match generations.get(&owned.resource) {
                    Some(current) if *current == generation => {
                        cache.insert(cache_key, payload.clone());
                    }
                    _ => {
                        debug!(
                            resource = %owned.resource,
                            "Resource invalidated during read, payload not cached"
                        );
                    }
                }
                Ok(payload)
            })
            .await
    }

    async fn write(&self, request: &ApiRequest) -> CacheResult<Value> {
        let fetcher = Arc::clone(&self.fetcher);
        let owned = request.clone();
        let payload = self
            .dedup
            .dedupe(request.dedup_key().as_str(), move || async move {
                fetcher.fetch(&owned).await
            })
            .await?;

        let invalidated = self.invalidate_resource(&request.resource);
        debug!(
            method = %request.method,
            resource = %request.resource,
            invalidated = invalidated,
            "Write completed, cached reads invalidated"
        );
        Ok(payload)
    }
}

impl<F: RequestFetcher> fmt::Debug for CachedClient<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedClient")
            .field("cache", &self.cache.name())
            .field("dedup", &self.dedup)
            .field("tracked_resources", &self.generations.len())
            .finish()
    }
}
