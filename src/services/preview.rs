//! Per-item fetch/preview orchestration.
//!
//! Drives the "preview one document" flow: resolve the signed URL through
//! the cache, track the document's individual loading state, and surface a
//! retryable failure status instead of propagating cache errors upward.
//!
//! Per id the status machine is `Idle -> Loading -> {Ready, Failed}`;
//! `Failed -> Loading` (retry, usually with a forced refresh) is the only
//! re-entrant transition, and a new preview call restarts the cycle from
//! `Ready`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::ExplorerError;
use crate::models::{DocKind, DocumentItem};
use crate::services::SignedUrlCache;

/// Resolved preview handed to the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPreview {
    pub url: String,
    pub kind: DocKind,
}

/// Per-document preview status as the UI collaborator sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewStatus {
    Idle,
    Loading,
    Ready { url: String, kind: DocKind },
    Failed { reason: String },
}

/// Orchestrates signed-URL resolution and loading state per document.
pub struct PreviewService {
    cache: Arc<SignedUrlCache>,
    loading: Mutex<HashSet<String>>,
    statuses: Mutex<HashMap<String, PreviewStatus>>,
}

impl PreviewService {
    pub fn new(cache: Arc<SignedUrlCache>) -> Self {
        Self {
            cache,
            loading: Mutex::new(HashSet::new()),
            statuses: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a document for viewing.
    ///
    /// `force_refresh` is the retry path: it bypasses a possibly stale or
    /// permission-revoked cached URL. A second preview for an id already in
    /// flight is rejected before touching the network; the loading id is
    /// removed on every exit path so a failed preview never leaves a
    /// permanently spinning control.
    pub async fn preview(
        &self,
        document: &DocumentItem,
        force_refresh: bool,
    ) -> Result<DocumentPreview, ExplorerError> {
        {
            let mut loading = self.loading.lock().await;
            if !loading.insert(document.id.clone()) {
                return Err(ExplorerError::AlreadyLoading(document.id.clone()));
            }
        }
        self.set_status(&document.id, PreviewStatus::Loading).await;

        let resolved = self.cache.resolve(&document.id, force_refresh).await;

        // Guaranteed cleanup regardless of outcome.
        self.loading.lock().await.remove(&document.id);

        match resolved {
            Ok(url) => {
                let preview = DocumentPreview {
                    url,
                    kind: document.doc_kind,
                };
                self.set_status(
                    &document.id,
                    PreviewStatus::Ready {
                        url: preview.url.clone(),
                        kind: preview.kind,
                    },
                )
                .await;
                Ok(preview)
            }
            Err(err) => {
                tracing::warn!(document_id = %document.id, error = %err, "preview failed");
                self.set_status(
                    &document.id,
                    PreviewStatus::Failed {
                        reason: err.to_string(),
                    },
                )
                .await;
                Err(err)
            }
        }
    }

    /// Current status for a document; `Idle` when never previewed.
    pub async fn status(&self, document_id: &str) -> PreviewStatus {
        self.statuses
            .lock()
            .await
            .get(document_id)
            .cloned()
            .unwrap_or(PreviewStatus::Idle)
    }

    pub async fn is_loading(&self, document_id: &str) -> bool {
        self.loading.lock().await.contains(document_id)
    }

    /// Ids with a resolution currently in flight.
    pub async fn loading_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.loading.lock().await.iter().cloned().collect();
        ids.sort();
        ids
    }

    async fn set_status(&self, document_id: &str, status: PreviewStatus) {
        self.statuses
            .lock()
            .await
            .insert(document_id.to_string(), status);
    }
}
