//! Backend contract for the document explorer.
//!
//! The engine consumes exactly two categories of backend capability:
//! listing a client's historical documents for a scope, and issuing
//! time-limited signed download URLs (plus the bulk zip endpoint built on
//! the same service). Transport details live in the HTTP implementation;
//! everything above this trait is backend-agnostic and testable with mocks.

mod http;

pub use http::HttpBackend;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::ExplorerError;
use crate::models::{DocumentItem, ExplorerScope};

/// A time-limited download URL issued by the backend.
#[derive(Debug, Clone)]
pub struct SignedUrl {
    pub url: String,
    /// Approximate expiry reported by the backend, when it reports one.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Descriptor of a server-built zip archive.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveDescriptor {
    /// Download URL of the assembled archive.
    #[serde(rename = "zipUrl")]
    pub url: String,
    /// Number of files the server packed into the archive.
    #[serde(default)]
    pub file_count: Option<usize>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

/// Narrow contract the explorer holds against the REST backend.
#[async_trait]
pub trait HistoryBackend: Send + Sync {
    /// Materialize the document collection for a scope. Paging is this
    /// implementation's concern; callers always receive the full list.
    async fn list_documents(
        &self,
        scope: &ExplorerScope,
    ) -> Result<Vec<DocumentItem>, ExplorerError>;

    /// Issue a fresh signed download URL for one document.
    async fn signed_download_url(&self, document_id: &str) -> Result<SignedUrl, ExplorerError>;

    /// Fetch the raw bytes behind a signed download URL.
    async fn fetch_file(&self, url: &str) -> Result<Vec<u8>, ExplorerError>;

    /// Ask the backend to assemble a zip archive from the given documents.
    async fn export_zip(&self, document_ids: &[String]) -> Result<ArchiveDescriptor, ExplorerError>;
}
