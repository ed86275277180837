//! Time-bounded cache of signed download URLs.
//!
//! Maps a document id to the last signed URL the backend issued for it.
//! Entries live for a fixed TTL chosen to expire strictly before the
//! backend-issued URL itself does, so a cached URL is never handed out past
//! its real validity. Provider failures leave the cache untouched: no
//! negative caching, the error propagates for per-item handling.
//!
//! Concurrent `resolve` calls for the same id serialize on a per-id gate;
//! the second caller re-checks the cache once the first finishes and reuses
//! its entry instead of issuing a duplicate request.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::backend::HistoryBackend;
use crate::error::ExplorerError;

/// Default URL TTL. The backend signs URLs for well over this window.
pub const DEFAULT_URL_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    url: String,
    issued_at: Instant,
}

/// Signed-URL cache scoped to one explorer session.
///
/// Constructed fresh per client/date scope; dropping the session drops the
/// cache, so entries can never leak across scopes.
pub struct SignedUrlCache {
    backend: Arc<dyn HistoryBackend>,
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SignedUrlCache {
    pub fn new(backend: Arc<dyn HistoryBackend>, ttl: Duration) -> Self {
        Self {
            backend,
            ttl,
            entries: Mutex::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a document's signed URL.
    ///
    /// Returns the cached URL when a live entry exists and `force_refresh`
    /// is false; otherwise calls the provider and replaces the entry with
    /// `issued_at = now`.
    pub async fn resolve(
        &self,
        document_id: &str,
        force_refresh: bool,
    ) -> Result<String, ExplorerError> {
        if document_id.trim().is_empty() {
            return Err(ExplorerError::InvalidDocumentId(document_id.to_string()));
        }

        if !force_refresh {
            if let Some(url) = self.lookup(document_id).await {
                tracing::trace!(document_id, "signed url cache hit");
                return Ok(url);
            }
        }

        let gate = self.gate(document_id).await;
        let _held = gate.lock().await;

        // The winner of the race may have refreshed the entry while we
        // waited on the gate.
        if !force_refresh {
            if let Some(url) = self.lookup(document_id).await {
                return Ok(url);
            }
        }

        let signed = self.backend.signed_download_url(document_id).await?;
        tracing::debug!(document_id, "signed url fetched from backend");

        let mut entries = self.entries.lock().await;
        entries.insert(
            document_id.to_string(),
            CacheEntry {
                url: signed.url.clone(),
                issued_at: Instant::now(),
            },
        );
        Ok(signed.url)
    }

    /// Drop one entry, forcing the next resolve to hit the backend.
    pub async fn invalidate(&self, document_id: &str) {
        self.entries.lock().await.remove(document_id);
    }

    /// Clear the cache as a unit. Used when the owning scope goes away.
    pub async fn invalidate_all(&self) {
        self.entries.lock().await.clear();
        self.inflight.lock().await.clear();
    }

    /// Number of stored entries, live or expired.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    async fn lookup(&self, document_id: &str) -> Option<String> {
        let entries = self.entries.lock().await;
        let entry = entries.get(document_id)?;
        (entry.issued_at.elapsed() < self.ttl).then(|| entry.url.clone())
    }

    async fn gate(&self, document_id: &str) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().await;
        inflight
            .entry(document_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::MockBackend;

    fn cache_with(backend: &Arc<MockBackend>, ttl: Duration) -> SignedUrlCache {
        SignedUrlCache::new(backend.clone() as Arc<dyn HistoryBackend>, ttl)
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_resolve_within_ttl_hits_cache() {
        let backend = Arc::new(MockBackend::new());
        let cache = cache_with(&backend, Duration::from_secs(300));

        let first = cache.resolve("f1", false).await.unwrap();
        let second = cache.resolve("f1", false).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.url_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_after_ttl_refetches() {
        let backend = Arc::new(MockBackend::new());
        let cache = cache_with(&backend, Duration::from_secs(300));

        cache.resolve("f1", false).await.unwrap();
        tokio::time::advance(Duration::from_secs(301)).await;
        cache.resolve("f1", false).await.unwrap();

        assert_eq!(backend.url_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_refresh_always_fetches_and_restamps() {
        let backend = Arc::new(MockBackend::new());
        let cache = cache_with(&backend, Duration::from_secs(300));

        cache.resolve("f1", false).await.unwrap();
        tokio::time::advance(Duration::from_secs(200)).await;
        cache.resolve("f1", true).await.unwrap();
        assert_eq!(backend.url_calls(), 2);

        // issued_at was re-stamped: 200s later the refreshed entry is
        // still live even though the original would have expired.
        tokio::time::advance(Duration::from_secs(200)).await;
        cache.resolve("f1", false).await.unwrap();
        assert_eq!(backend.url_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_leaves_cache_unchanged() {
        let backend = Arc::new(MockBackend::new());
        backend.fail_next_url("f1");
        let cache = cache_with(&backend, Duration::from_secs(300));

        let err = cache.resolve("f1", false).await.unwrap_err();
        assert!(matches!(err, ExplorerError::Transient(_)));
        assert!(cache.is_empty().await);

        // A later attempt fetches cleanly; no negative entry was stored.
        cache.resolve("f1", false).await.unwrap();
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_resolves_share_one_fetch() {
        let backend = Arc::new(MockBackend::with_delay(Duration::from_millis(50)));
        let cache = Arc::new(cache_with(&backend, Duration::from_secs(300)));

        let a = cache.clone();
        let b = cache.clone();
        let (ra, rb) = tokio::join!(a.resolve("f1", false), b.resolve("f1", false));

        assert_eq!(ra.unwrap(), rb.unwrap());
        assert_eq!(backend.url_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_ids_do_not_share_entries() {
        let backend = Arc::new(MockBackend::new());
        let cache = cache_with(&backend, Duration::from_secs(300));

        let u1 = cache.resolve("f1", false).await.unwrap();
        let u2 = cache.resolve("f2", false).await.unwrap();

        assert_ne!(u1, u2);
        assert_eq!(backend.url_calls(), 2);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_all_clears_everything() {
        let backend = Arc::new(MockBackend::new());
        let cache = cache_with(&backend, Duration::from_secs(300));

        cache.resolve("f1", false).await.unwrap();
        cache.resolve("f2", false).await.unwrap();
        cache.invalidate_all().await;

        assert!(cache.is_empty().await);
        cache.resolve("f1", false).await.unwrap();
        assert_eq!(backend.url_calls(), 3);
    }

    #[tokio::test]
    async fn test_empty_id_rejected_without_network() {
        let backend = Arc::new(MockBackend::new());
        let cache = cache_with(&backend, Duration::from_secs(300));

        let err = cache.resolve("  ", false).await.unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidDocumentId(_)));
        assert_eq!(backend.url_calls(), 0);
    }
}
