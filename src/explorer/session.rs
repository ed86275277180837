//! Explorer session: one scope, one cache, one selection.
//!
//! A session owns everything that must not survive a scope change: the
//! materialized document collection, the signed-URL cache, the selection,
//! and per-item preview state. Callers construct a fresh session when the
//! client or date range changes; in-flight work from the old session is
//! abandoned with it instead of being applied to stale state.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::{ArchiveDescriptor, HistoryBackend};
use crate::error::ExplorerError;
use crate::explorer::{
    filter_documents, group_documents, process_summaries, sort_documents, DocumentGroup,
    FilterState, ProcessSummary, SelectionManager, ViewState,
};
use crate::models::{DocumentItem, ExplorerScope};
use crate::services::{
    DocumentPreview, DownloadService, DownloadedFile, ExportCoordinator, LinkCopyOutcome,
    LinkSink, PreviewService, PreviewStatus, SignedUrlCache,
};

/// One explorer session over a fixed scope.
pub struct ExplorerSession {
    scope: ExplorerScope,
    backend: Arc<dyn HistoryBackend>,
    documents: Vec<DocumentItem>,
    filters: FilterState,
    view: ViewState,
    selection: SelectionManager,
    preview: PreviewService,
    download: DownloadService,
    export: ExportCoordinator,
}

impl ExplorerSession {
    /// Create a session for a scope. The URL cache is built fresh here and
    /// dies with the session, so entries cannot leak across scopes.
    pub fn new(
        backend: Arc<dyn HistoryBackend>,
        scope: ExplorerScope,
        url_ttl: Duration,
    ) -> Result<Self, ExplorerError> {
        if !scope.is_valid() {
            return Err(ExplorerError::Config(
                "explorer scope requires a client id".into(),
            ));
        }
        let cache = Arc::new(SignedUrlCache::new(backend.clone(), url_ttl));
        Ok(Self {
            scope,
            backend: backend.clone(),
            documents: Vec::new(),
            filters: FilterState::default(),
            view: ViewState::default(),
            selection: SelectionManager::new(),
            preview: PreviewService::new(cache.clone()),
            download: DownloadService::new(backend.clone(), cache.clone()),
            export: ExportCoordinator::new(backend, cache),
        })
    }

    pub fn scope(&self) -> &ExplorerScope {
        &self.scope
    }

    /// Re-materialize the document collection from the backend.
    ///
    /// Selected ids that disappeared from the collection are dropped so the
    /// selection never references documents no longer in view.
    pub async fn refresh(&mut self) -> Result<usize, ExplorerError> {
        let documents = self.backend.list_documents(&self.scope).await?;
        let known: HashSet<&str> = documents.iter().map(|d| d.id.as_str()).collect();
        self.selection.retain_known(&known);
        self.documents = documents;
        tracing::debug!(scope = %self.scope, count = self.documents.len(), "collection refreshed");
        Ok(self.documents.len())
    }

    /// The full unfiltered collection, in backend order.
    pub fn documents(&self) -> &[DocumentItem] {
        &self.documents
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: FilterState) {
        self.filters = filters;
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn set_view(&mut self, view: ViewState) {
        self.view = view;
    }

    /// The currently visible collection: filtered, then sorted.
    pub fn visible(&self) -> Vec<DocumentItem> {
        let mut docs = filter_documents(&self.documents, &self.filters);
        sort_documents(&mut docs, &self.view);
        docs
    }

    /// Visible documents bucketed along the view's grouping dimension.
    pub fn grouped(&self) -> Vec<DocumentGroup> {
        group_documents(&self.visible(), self.view.group_by)
    }

    /// Per-process counts over the visible collection, for the sidebar.
    pub fn process_summaries(&self) -> Vec<ProcessSummary> {
        process_summaries(&self.visible())
    }

    pub fn toggle_selection(&mut self, document_id: &str) {
        self.selection.toggle(document_id);
    }

    /// Select exactly the currently visible documents. Ids hidden by the
    /// active filter are never silently included.
    pub fn select_all_visible(&mut self) {
        let visible = self.visible();
        self.selection
            .select_all(visible.into_iter().map(|d| d.id));
    }

    /// Replace the selection with explicit ids (batch/CLI path). Ids not
    /// present in the backing collection are dropped.
    pub fn set_selection<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let known: HashSet<&str> = self.documents.iter().map(|d| d.id.as_str()).collect();
        let ids: Vec<String> = ids
            .into_iter()
            .map(Into::into)
            .filter(|id| known.contains(id.as_str()))
            .collect();
        self.selection.select_all(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    /// Resolve one document for viewing. `force_refresh` is the retry path.
    pub async fn preview(
        &self,
        document_id: &str,
        force_refresh: bool,
    ) -> Result<DocumentPreview, ExplorerError> {
        let document = self
            .documents
            .iter()
            .find(|d| d.id == document_id)
            .ok_or_else(|| ExplorerError::InvalidDocumentId(document_id.to_string()))?;
        self.preview.preview(document, force_refresh).await
    }

    /// Fetch one document's bytes for saving under its original filename.
    pub async fn download(
        &self,
        document_id: &str,
        force_refresh: bool,
    ) -> Result<DownloadedFile, ExplorerError> {
        let document = self
            .documents
            .iter()
            .find(|d| d.id == document_id)
            .ok_or_else(|| ExplorerError::InvalidDocumentId(document_id.to_string()))?;
        self.download.download(document, force_refresh).await
    }

    pub async fn preview_status(&self, document_id: &str) -> PreviewStatus {
        self.preview.status(document_id).await
    }

    pub async fn loading_ids(&self) -> Vec<String> {
        self.preview.loading_ids().await
    }

    /// Export the current selection as a server-built zip archive.
    pub async fn export_zip(&self) -> Result<ArchiveDescriptor, ExplorerError> {
        self.export.export_zip(&self.selection.ids()).await
    }

    /// Copy signed links for the current selection into the sink.
    pub async fn copy_links(&self, sink: &dyn LinkSink) -> Result<LinkCopyOutcome, ExplorerError> {
        self.export.copy_links(&self.selection.ids(), sink).await
    }
}
