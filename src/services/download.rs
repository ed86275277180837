//! Direct document download orchestration.
//!
//! Fetches a document's bytes through its signed URL so callers can save
//! the file under its original name. Mirrors the preview flow: the URL is
//! resolved through the cache, the document id is held in a loading set for
//! the duration, and the id is removed on every exit path.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::backend::HistoryBackend;
use crate::error::ExplorerError;
use crate::models::DocumentItem;
use crate::services::SignedUrlCache;

/// A fetched document, ready to be written under its original filename.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Resolves and fetches document bytes, one in-flight download per id.
pub struct DownloadService {
    backend: Arc<dyn HistoryBackend>,
    cache: Arc<SignedUrlCache>,
    loading: Mutex<HashSet<String>>,
}

impl DownloadService {
    pub fn new(backend: Arc<dyn HistoryBackend>, cache: Arc<SignedUrlCache>) -> Self {
        Self {
            backend,
            cache,
            loading: Mutex::new(HashSet::new()),
        }
    }

    /// Fetch a document's bytes.
    ///
    /// `force_refresh` bypasses a possibly stale cached URL. A second
    /// download for an id already in flight is rejected before touching the
    /// network.
    pub async fn download(
        &self,
        document: &DocumentItem,
        force_refresh: bool,
    ) -> Result<DownloadedFile, ExplorerError> {
        {
            let mut loading = self.loading.lock().await;
            if !loading.insert(document.id.clone()) {
                return Err(ExplorerError::AlreadyLoading(document.id.clone()));
            }
        }

        let fetched = self.fetch(document, force_refresh).await;

        // Guaranteed cleanup regardless of outcome.
        self.loading.lock().await.remove(&document.id);
        fetched
    }

    async fn fetch(
        &self,
        document: &DocumentItem,
        force_refresh: bool,
    ) -> Result<DownloadedFile, ExplorerError> {
        let url = self.cache.resolve(&document.id, force_refresh).await?;
        let bytes = self.backend.fetch_file(&url).await?;
        tracing::debug!(document_id = %document.id, size = bytes.len(), "document downloaded");
        Ok(DownloadedFile {
            file_name: document.file_name.clone(),
            bytes,
        })
    }

    pub async fn is_loading(&self, document_id: &str) -> bool {
        self.loading.lock().await.contains(document_id)
    }
}
