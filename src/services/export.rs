//! Bulk export coordination.
//!
//! Given the current selection, requests a server-built zip archive or
//! resolves a batch of shareable links. Link resolution continues past
//! individual failures and reports aggregate counts; it never aborts the
//! batch on one bad document. Both operations reject an empty selection
//! before any network activity.

use std::sync::Arc;

use crate::backend::{ArchiveDescriptor, HistoryBackend};
use crate::error::ExplorerError;
use crate::services::SignedUrlCache;

/// Receives the newline-joined links produced by a bulk copy.
pub trait LinkSink: Send + Sync {
    fn write_links(&self, text: &str) -> Result<(), ExplorerError>;
}

/// System clipboard sink.
pub struct ClipboardSink;

impl LinkSink for ClipboardSink {
    fn write_links(&self, text: &str) -> Result<(), ExplorerError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ExplorerError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ExplorerError::Clipboard(e.to_string()))
    }
}

/// Aggregate result of a bulk link copy.
#[derive(Debug)]
pub struct LinkCopyOutcome {
    /// Links successfully resolved and written to the sink.
    pub copied: usize,
    /// Per-document failures, in selection order.
    pub failed: Vec<(String, ExplorerError)>,
}

impl LinkCopyOutcome {
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Coordinates bulk operations over the current selection.
pub struct ExportCoordinator {
    backend: Arc<dyn HistoryBackend>,
    cache: Arc<SignedUrlCache>,
}

impl ExportCoordinator {
    pub fn new(backend: Arc<dyn HistoryBackend>, cache: Arc<SignedUrlCache>) -> Self {
        Self { backend, cache }
    }

    /// Request a zip archive built from the selected documents.
    ///
    /// The full id set goes to the backend in a single request; whether a
    /// partial archive is acceptable is the backend's domain decision.
    pub async fn export_zip(
        &self,
        selected_ids: &[String],
    ) -> Result<ArchiveDescriptor, ExplorerError> {
        if selected_ids.is_empty() {
            return Err(ExplorerError::EmptySelection);
        }
        let descriptor = self.backend.export_zip(selected_ids).await?;
        tracing::info!(
            requested = selected_ids.len(),
            packed = ?descriptor.file_count,
            "zip export ready"
        );
        Ok(descriptor)
    }

    /// Resolve a signed link per selected document and write the successes,
    /// newline-joined, to the sink.
    ///
    /// Cached URLs are reused where still valid. Individual failures are
    /// collected, not fatal; nothing is written when every id fails.
    pub async fn copy_links(
        &self,
        selected_ids: &[String],
        sink: &dyn LinkSink,
    ) -> Result<LinkCopyOutcome, ExplorerError> {
        if selected_ids.is_empty() {
            return Err(ExplorerError::EmptySelection);
        }

        let mut links = Vec::with_capacity(selected_ids.len());
        let mut failed = Vec::new();
        for id in selected_ids {
            match self.cache.resolve(id, false).await {
                Ok(url) => links.push(url),
                Err(err) => {
                    tracing::warn!(document_id = %id, error = %err, "link resolution failed");
                    failed.push((id.clone(), err));
                }
            }
        }

        if !links.is_empty() {
            sink.write_links(&links.join("\n"))?;
        }

        Ok(LinkCopyOutcome {
            copied: links.len(),
            failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{CapturingSink, MockBackend};
    use std::time::Duration;

    fn coordinator_with(backend: &Arc<MockBackend>) -> ExportCoordinator {
        let backend_dyn = backend.clone() as Arc<dyn HistoryBackend>;
        let cache = Arc::new(SignedUrlCache::new(
            backend_dyn.clone(),
            Duration::from_secs(300),
        ));
        ExportCoordinator::new(backend_dyn, cache)
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_export_zip_rejects_empty_selection() {
        let backend = Arc::new(MockBackend::new());
        let coord = coordinator_with(&backend);

        let err = coord.export_zip(&[]).await.unwrap_err();
        assert!(matches!(err, ExplorerError::EmptySelection));
        assert_eq!(backend.zip_calls(), 0);
    }

    #[tokio::test]
    async fn test_export_zip_single_request() {
        let backend = Arc::new(MockBackend::new());
        let coord = coordinator_with(&backend);

        let descriptor = coord.export_zip(&ids(&["f1", "f2", "f3"])).await.unwrap();
        assert_eq!(descriptor.file_count, Some(3));
        assert_eq!(backend.zip_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_links_partial_failure() {
        let backend = Arc::new(MockBackend::new());
        backend.fail_always_url("f2");
        let coord = coordinator_with(&backend);
        let sink = CapturingSink::default();

        let outcome = coord
            .copy_links(&ids(&["f1", "f2", "f3"]), &sink)
            .await
            .unwrap();

        assert_eq!(outcome.copied, 2);
        assert_eq!(outcome.failed_count(), 1);
        assert_eq!(outcome.failed[0].0, "f2");
        assert!(!outcome.is_complete());

        // Only the resolved links were written, newline-joined.
        let written = sink.last().expect("sink received links");
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("f1"));
        assert!(lines[1].contains("f3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_links_reuses_cache_entries() {
        let backend = Arc::new(MockBackend::new());
        let coord = coordinator_with(&backend);
        let sink = CapturingSink::default();

        coord.cache.resolve("f1", false).await.unwrap();
        let outcome = coord.copy_links(&ids(&["f1", "f2"]), &sink).await.unwrap();

        assert_eq!(outcome.copied, 2);
        // f1 came from the cache; only f2 hit the backend.
        assert_eq!(backend.url_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_links_all_failed_writes_nothing() {
        let backend = Arc::new(MockBackend::new());
        backend.fail_always_url("f1");
        backend.fail_always_url("f2");
        let coord = coordinator_with(&backend);
        let sink = CapturingSink::default();

        let outcome = coord.copy_links(&ids(&["f1", "f2"]), &sink).await.unwrap();
        assert_eq!(outcome.copied, 0);
        assert_eq!(outcome.failed_count(), 2);
        assert!(sink.last().is_none());
    }

    #[tokio::test]
    async fn test_copy_links_rejects_empty_selection() {
        let backend = Arc::new(MockBackend::new());
        let coord = coordinator_with(&backend);
        let sink = CapturingSink::default();

        let err = coord.copy_links(&[], &sink).await.unwrap_err();
        assert!(matches!(err, ExplorerError::EmptySelection));
        assert_eq!(backend.url_calls(), 0);
    }
}
