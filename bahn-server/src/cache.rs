//! Caching layer for HTTP responses.
//!
//! Successful GET responses are cached by request URI (path and query)
//! for a fixed TTL. Error responses, including not-ready connection
//! reads, always go through to the handler.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes, to_bytes};
use axum::extract::{OriginalUri, Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use moka::future::Cache as MokaCache;
use tracing::{trace, warn};

/// Largest response body that will be buffered for caching.
const MAX_CACHED_BODY: usize = 64 * 1024 * 1024;

/// Configuration for the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 1000,
        }
    }
}

/// A buffered response.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        if let Some(content_type) = self.content_type {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, content_type);
        }
        response
    }
}

/// URI-keyed response cache. Cheap to clone.
#[derive(Clone)]
pub struct ResponseCache {
    entries: MokaCache<String, Arc<CachedResponse>>,
}

impl ResponseCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let entries = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { entries }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<CachedResponse>> {
        self.entries.get(key).await
    }

    pub async fn insert(&self, key: String, response: CachedResponse) {
        self.entries.insert(key, Arc::new(response)).await;
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }
}

/// Middleware serving and filling the response cache.
///
/// Install with `axum::middleware::from_fn_with_state`.
pub async fn cache_responses(
    State(cache): State<ResponseCache>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    // nested routers see a stripped URI; key on the full one
    let key = match request.extensions().get::<OriginalUri>() {
        Some(OriginalUri(uri)) => uri.to_string(),
        None => request.uri().to_string(),
    };
    if let Some(hit) = cache.get(&key).await {
        trace!(%key, "response cache hit");
        return CachedResponse::clone(&hit).into_response();
    }

    let response = next.run(request).await;
    if !response.status().is_success() {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_CACHED_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(%key, error = %e, "failed to buffer response for caching");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    cache
        .insert(
            key,
            CachedResponse {
                status: parts.status,
                content_type: parts.headers.get(header::CONTENT_TYPE).cloned(),
                body: bytes.clone(),
            },
        )
        .await;

    Response::from_parts(parts, Body::from(bytes))
}
