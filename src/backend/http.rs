//! REST implementation of the history backend.
//!
//! Speaks the operations API: JSON envelopes of the form
//! `{success, message, errorCode, data}` over HTTPS with bearer-token auth.
//! Process history records arrive nested (file/process/contador sub-objects)
//! and paginated; this module walks the pages and flattens each record into
//! a `DocumentItem` before anything upstream sees it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::error::ExplorerError;
use crate::models::{self, DocKind, DocumentItem, ExplorerScope, PaymentPeriod};

use super::{ArchiveDescriptor, HistoryBackend, SignedUrl};

/// Page size used when materializing the document collection.
const LIST_PAGE_LIMIT: usize = 200;

/// HTTP client for the operations REST API.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Create a backend client against an API base URL.
    ///
    /// The bearer token, when given, is attached to every request.
    pub fn new(
        base_url: &str,
        auth_token: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ExplorerError> {
        // Url::join treats a base without a trailing slash as a file path
        // and would drop its last segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| ExplorerError::Config(format!("invalid api base url: {e}")))?;

        let mut headers = HeaderMap::new();
        if let Some(token) = auth_token {
            let value = format!("Bearer {token}")
                .parse()
                .map_err(|_| ExplorerError::Config("auth token is not header-safe".into()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .default_headers(headers)
            .build()
            .map_err(|e| ExplorerError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ExplorerError> {
        self.base_url
            .join(path)
            .map_err(|e| ExplorerError::Backend(format!("invalid endpoint {path}: {e}")))
    }

    /// Issue a GET and unwrap the response envelope.
    async fn get_enveloped<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<T, ExplorerError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, context))?;
        Self::unwrap_envelope(response, context).await
    }

    async fn unwrap_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
        context: &str,
    ) -> Result<T, ExplorerError> {
        let status = response.status();
        if !status.is_success() {
            return Err(map_status(status, response.headers(), context));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| ExplorerError::Backend(format!("malformed response for {context}: {e}")))?;

        if !envelope.success {
            return Err(ExplorerError::Backend(format!(
                "{context}: {} ({})",
                envelope.message,
                envelope.error_code.as_deref().unwrap_or("no code")
            )));
        }
        envelope
            .data
            .ok_or_else(|| ExplorerError::Backend(format!("{context}: envelope without data")))
    }
}

#[async_trait::async_trait]
impl HistoryBackend for HttpBackend {
    async fn list_documents(
        &self,
        scope: &ExplorerScope,
    ) -> Result<Vec<DocumentItem>, ExplorerError> {
        if !scope.is_valid() {
            return Err(ExplorerError::Config("scope requires a client id".into()));
        }

        let mut documents = Vec::new();
        let mut page = 1usize;
        loop {
            let mut url = self.endpoint("processhistory")?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("page", &page.to_string());
                query.append_pair("limit", &LIST_PAGE_LIMIT.to_string());
                query.append_pair("clientId[]", &scope.client_id);
                if let Some(from) = scope.date_from {
                    query.append_pair("from", &from.to_string());
                }
                if let Some(to) = scope.date_to {
                    query.append_pair("to", &to.to_string());
                }
            }

            let page_data: HistoryPage = self.get_enveloped(url, "processhistory").await?;
            let total_pages = page_data.total_pages.max(1);
            documents.extend(page_data.data.into_iter().map(flatten_record));

            tracing::debug!(page, total_pages, count = documents.len(), "listed history page");
            if page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(documents)
    }

    async fn signed_download_url(&self, document_id: &str) -> Result<SignedUrl, ExplorerError> {
        if document_id.trim().is_empty() {
            return Err(ExplorerError::InvalidDocumentId(document_id.to_string()));
        }
        let url = self.endpoint(&format!("file/{document_id}/download-url"))?;
        let data: DownloadUrlData = self
            .get_enveloped(url, &format!("download-url for {document_id}"))
            .await?;
        Ok(SignedUrl {
            url: data.url,
            expires_at: data.expires_at,
        })
    }

    async fn fetch_file(&self, url: &str) -> Result<Vec<u8>, ExplorerError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, "file download"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(map_status(status, response.headers(), "file download"));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(e, "file download"))?;
        Ok(bytes.to_vec())
    }

    async fn export_zip(
        &self,
        document_ids: &[String],
    ) -> Result<ArchiveDescriptor, ExplorerError> {
        let url = self.endpoint("documents/zip")?;
        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({ "ids": document_ids }))
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, "zip export"))?;
        Self::unwrap_envelope(response, "zip export").await
    }
}

/// Standard response envelope of the operations API.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    message: String,
    #[serde(rename = "errorCode")]
    error_code: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryPage {
    data: Vec<HistoryRecord>,
    #[serde(default)]
    total_pages: usize,
}

/// One process-history record as the backend ships it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryRecord {
    #[serde(default)]
    original_date: Option<DateTime<Utc>>,
    #[serde(default)]
    date_completed: Option<DateTime<Utc>>,
    #[serde(default)]
    payment_period: Option<String>,
    file: FileRecord,
    process: ProcessRecord,
    #[serde(default)]
    contador: Option<ContadorRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileRecord {
    id: String,
    original_name: String,
    #[serde(rename = "type", default)]
    mime_type: String,
    #[serde(default)]
    size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ProcessRecord {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContadorRecord {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DownloadUrlData {
    url: String,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

/// Flatten a nested history record into a display-ready document.
fn flatten_record(record: HistoryRecord) -> DocumentItem {
    let bucket_date = record.original_date.or(record.date_completed);
    let month_label = models::month_label(bucket_date);
    let month_value = models::month_value(bucket_date);
    let doc_kind = DocKind::detect(&record.file.mime_type, &record.file.original_name);
    let accountant = record.contador.and_then(|c| {
        let name = format!(
            "{} {}",
            c.first_name.unwrap_or_default(),
            c.last_name.unwrap_or_default()
        );
        let name = name.trim().to_string();
        (!name.is_empty()).then_some(name)
    });

    DocumentItem {
        id: record.file.id,
        display_title: models::display_title(&record.process.name, &month_label),
        file_name: record.file.original_name,
        mime_type: record.file.mime_type,
        size_bytes: record.file.size,
        process_id: record.process.id,
        process_name: record.process.name,
        doc_kind,
        payment_period: record
            .payment_period
            .as_deref()
            .and_then(PaymentPeriod::from_tag),
        month_label,
        month_value,
        original_date: record.original_date,
        completed_at: record.date_completed,
        accountant,
    }
}

/// Classify a non-success HTTP status into the explorer error taxonomy.
fn map_status(status: StatusCode, headers: &HeaderMap, context: &str) -> ExplorerError {
    match status {
        StatusCode::NOT_FOUND => ExplorerError::NotFound(context.to_string()),
        StatusCode::TOO_MANY_REQUESTS => ExplorerError::RateLimited {
            retry_after: parse_retry_after(headers),
        },
        s if s.is_server_error() => {
            ExplorerError::Transient(format!("{context}: server returned {s}"))
        }
        s => ExplorerError::Backend(format!("{context}: unexpected status {s}")),
    }
}

fn map_reqwest_error(err: reqwest::Error, context: &str) -> ExplorerError {
    if err.is_timeout() || err.is_connect() {
        ExplorerError::Transient(format!("{context}: {err}"))
    } else {
        ExplorerError::Backend(format!("{context}: {err}"))
    }
}

/// Parse a Retry-After header given in seconds. Date-form values are
/// ignored; the hint is optional anyway.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn sample_record_json() -> &'static str {
        r#"{
            "id": "ph-1",
            "originalDate": "2024-01-15T00:00:00Z",
            "dateCompleted": "2024-02-01T12:00:00Z",
            "paymentPeriod": "MONTHLY",
            "file": {
                "id": "f-1",
                "originalName": "declaracion_enero.pdf",
                "type": "application/pdf",
                "size": 20480
            },
            "process": { "id": "p-imss", "name": "IMSS" },
            "contador": { "firstName": "Ana", "lastName": "Robles" }
        }"#
    }

    #[test]
    fn test_flatten_record() {
        let record: HistoryRecord = serde_json::from_str(sample_record_json()).unwrap();
        let doc = flatten_record(record);

        assert_eq!(doc.id, "f-1");
        assert_eq!(doc.file_name, "declaracion_enero.pdf");
        assert_eq!(doc.doc_kind, DocKind::Pdf);
        assert_eq!(doc.process_id, "p-imss");
        assert_eq!(doc.month_label, "ene 2024");
        assert_eq!(doc.month_value, "2024-01");
        assert_eq!(doc.display_title, "IMSS · ene 2024");
        assert_eq!(doc.payment_period, Some(PaymentPeriod::Monthly));
        assert_eq!(doc.accountant.as_deref(), Some("Ana Robles"));
    }

    #[test]
    fn test_flatten_record_minimal() {
        let json = r#"{
            "file": { "id": "f-2", "originalName": "foto" },
            "process": { "id": "p-1", "name": "ISR" }
        }"#;
        let record: HistoryRecord = serde_json::from_str(json).unwrap();
        let doc = flatten_record(record);

        assert_eq!(doc.month_label, models::NO_DATE_LABEL);
        assert_eq!(doc.month_value, "");
        assert_eq!(doc.doc_kind, DocKind::Other);
        assert_eq!(doc.payment_period, None);
        assert_eq!(doc.accountant, None);
    }

    #[test]
    fn test_envelope_failure_detection() {
        let json = r#"{
            "success": false,
            "message": "permiso denegado",
            "errorCode": "FORBIDDEN",
            "data": null
        }"#;
        let envelope: Envelope<DownloadUrlData> = serde_json::from_str(json).unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.error_code.as_deref(), Some("FORBIDDEN"));
    }

    #[test]
    fn test_status_mapping() {
        let headers = HeaderMap::new();
        assert!(matches!(
            map_status(StatusCode::NOT_FOUND, &headers, "x"),
            ExplorerError::NotFound(_)
        ));
        assert!(matches!(
            map_status(StatusCode::BAD_GATEWAY, &headers, "x"),
            ExplorerError::Transient(_)
        ));
        assert!(matches!(
            map_status(StatusCode::FORBIDDEN, &headers, "x"),
            ExplorerError::Backend(_)
        ));
    }

    #[test]
    fn test_retry_after_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("42"));
        match map_status(StatusCode::TOO_MANY_REQUESTS, &headers, "x") {
            ExplorerError::RateLimited { retry_after } => {
                assert_eq!(retry_after, Some(Duration::from_secs(42)));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }

        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2025"));
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn test_archive_descriptor_shape() {
        let json = r#"{ "zipUrl": "https://files/archive.zip", "fileCount": 3 }"#;
        let desc: ArchiveDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(desc.url, "https://files/archive.zip");
        assert_eq!(desc.file_count, Some(3));
        assert_eq!(desc.size_bytes, None);
    }
}
