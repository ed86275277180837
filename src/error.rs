//! Error taxonomy for the document explorer.
//!
//! Backend failures are classified at the HTTP boundary so callers can
//! distinguish retryable conditions from caller mistakes. Per-item preview
//! failures never propagate past the preview service; they resolve to a
//! `Failed` status instead.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the explorer engine.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// The document id is no longer resolvable by the backend.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// The backend signalled too many requests. No automatic retry is
    /// performed; the condition is reported upward with the backend's
    /// retry-after hint when it sent one.
    #[error("Rate limited by backend{}", retry_after_hint(.retry_after))]
    RateLimited { retry_after: Option<Duration> },

    /// Timeout, connection reset, or a 5xx the caller may retry.
    #[error("Transient network failure: {0}")]
    Transient(String),

    /// The backend answered but the response was unusable (non-success
    /// envelope, unexpected status, malformed body).
    #[error("Backend error: {0}")]
    Backend(String),

    /// Bulk operation invoked with nothing selected.
    #[error("No documents selected")]
    EmptySelection,

    /// A document id that is empty or unknown to the current scope.
    #[error("Invalid document id: {0:?}")]
    InvalidDocumentId(String),

    /// A preview for this id is already in flight.
    #[error("A fetch for document {0} is already in progress")]
    AlreadyLoading(String),

    /// The link sink (system clipboard) rejected the write.
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExplorerError {
    /// Whether a user-triggered retry (forced refresh) is worth offering.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transient(_) | Self::RateLimited { .. } | Self::Backend(_)
        )
    }
}

fn retry_after_hint(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(d) => format!(" (retry after {}s)", d.as_secs()),
        None => String::new(),
    }
}
