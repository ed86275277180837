//! Document models for the fiscal history explorer.
//!
//! A `DocumentItem` is one historical fiscal document produced for a client.
//! Identity is carried by `id` alone; every other field is a display or
//! filter attribute and never participates in identity comparisons.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Spanish month abbreviations used for month bucket labels.
const MONTH_ABBREV: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
];

/// Label used when a document carries no usable date.
pub const NO_DATE_LABEL: &str = "Sin fecha";

/// Broad kind of a stored document, used for filtering and preview routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocKind {
    Pdf,
    Image,
    Other,
}

impl DocKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::Other => "other",
        }
    }

    /// Display label as shown in the explorer UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Image => "Imagen",
            Self::Other => "Otros",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "image" | "imagen" => Some(Self::Image),
            "other" | "otros" => Some(Self::Other),
            _ => None,
        }
    }

    /// Derive the kind of a document.
    ///
    /// The MIME type is authoritative when present; the filename extension
    /// is an explicit fallback for records that arrive without one.
    pub fn detect(mime_type: &str, file_name: &str) -> Self {
        let mime = mime_type.trim();
        if !mime.is_empty() {
            return Self::from_mime(mime);
        }
        match mime_guess::from_path(file_name).first_raw() {
            Some(guessed) => Self::from_mime(guessed),
            None => Self::Other,
        }
    }

    fn from_mime(mime: &str) -> Self {
        let mime = mime.to_ascii_lowercase();
        if mime == "application/pdf" {
            Self::Pdf
        } else if mime.starts_with("image/") {
            Self::Image
        } else {
            Self::Other
        }
    }
}

/// Payment periodicity of the fiscal process a document evidences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentPeriod {
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

impl PaymentPeriod {
    /// Backend wire tag for this period.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Monthly => "MONTHLY",
            Self::Quarterly => "QUARTERLY",
            Self::Semiannual => "SEMIANNUAL",
            Self::Annual => "ANNUAL",
        }
    }

    /// Parse a backend tag. Unknown tags map to `None`; a document without
    /// a period never matches a period criterion.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "MONTHLY" => Some(Self::Monthly),
            "QUARTERLY" => Some(Self::Quarterly),
            "SEMIANNUAL" => Some(Self::Semiannual),
            "ANNUAL" => Some(Self::Annual),
            _ => None,
        }
    }
}

/// A historical fiscal document produced for a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentItem {
    /// Unique identifier, stable across requests within a client scope.
    pub id: String,
    /// "Process · month" title shown in cards and tables.
    pub display_title: String,
    /// Original filename as uploaded.
    pub file_name: String,
    /// MIME type reported by the backend; may be empty.
    pub mime_type: String,
    /// Size in bytes, when the backend reports one.
    pub size_bytes: Option<u64>,
    /// Fiscal process this document evidences.
    pub process_id: String,
    pub process_name: String,
    /// Categorical kind derived from `mime_type` (filename fallback).
    pub doc_kind: DocKind,
    /// Payment periodicity of the process, when known.
    pub payment_period: Option<PaymentPeriod>,
    /// Month bucket label ("ene 2024"), from original date or completion date.
    pub month_label: String,
    /// Month bucket value ("2024-01"); empty when no date is known.
    pub month_value: String,
    /// Date the underlying obligation refers to.
    pub original_date: Option<DateTime<Utc>>,
    /// Date the process was completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Display name of the responsible accountant.
    pub accountant: Option<String>,
}

impl DocumentItem {
    /// Date used for month bucketing: the original date when present,
    /// the completion date otherwise.
    pub fn bucket_date(&self) -> Option<DateTime<Utc>> {
        self.original_date.or(self.completed_at)
    }
}

/// Month bucket label for a date, e.g. "mar 2024".
pub fn month_label(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(d) => format!("{} {}", MONTH_ABBREV[d.month0() as usize], d.year()),
        None => NO_DATE_LABEL.to_string(),
    }
}

/// Sortable month value for a date, e.g. "2024-03". Empty when unknown.
pub fn month_value(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(d) => d.format("%Y-%m").to_string(),
        None => String::new(),
    }
}

/// Display title for a document: process name and month bucket.
pub fn display_title(process_name: &str, month_label: &str) -> String {
    format!("{} · {}", process_name, month_label)
}
