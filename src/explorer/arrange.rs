//! Grouping and sorting engine.
//!
//! Projects the filtered collection into a flat ordered sequence or into
//! buckets keyed by process or month. Ties always break by `id` ascending
//! so repeated calls with identical input produce identical output. The
//! view mode (cards vs table) is carried in `ViewState` for the caller's
//! benefit but never consulted here.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::DocumentItem;

/// Closed set of sortable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    OriginalDate,
    CompletedAt,
    ProcessName,
    SizeBytes,
}

impl SortKey {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "originalDate" | "original_date" => Some(Self::OriginalDate),
            "dateCompleted" | "completed_at" => Some(Self::CompletedAt),
            "processName" | "process_name" => Some(Self::ProcessName),
            "size" | "size_bytes" => Some(Self::SizeBytes),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Grouping dimension for bucketed views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Process,
    Month,
}

/// Presentation mode. Never affects inclusion or ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Cards,
    Table,
}

/// Pure presentation state: arrangement, never inclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub group_by: GroupBy,
    pub view_mode: ViewMode,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            group_by: GroupBy::Process,
            view_mode: ViewMode::Cards,
            sort_by: SortKey::OriginalDate,
            sort_order: SortOrder::Desc,
        }
    }
}

/// A named bucket of documents sharing a process or month. Derived, never
/// persisted; recomputed whenever the filtered set or dimension changes.
#[derive(Debug, Clone)]
pub struct DocumentGroup {
    /// Bucket key: process id or month label.
    pub key: String,
    /// Bucket title: process name or month label.
    pub label: String,
    pub documents: Vec<DocumentItem>,
}

/// Sort documents in place under the view's comparator.
pub fn sort_documents(documents: &mut [DocumentItem], view: &ViewState) {
    documents.sort_by(|a, b| compare(a, b, view.sort_by, view.sort_order));
}

fn compare(a: &DocumentItem, b: &DocumentItem, key: SortKey, order: SortOrder) -> Ordering {
    let by_key = match key {
        // Missing dates sort as the epoch minimum.
        SortKey::OriginalDate => date_ts(a.original_date).cmp(&date_ts(b.original_date)),
        SortKey::CompletedAt => date_ts(a.completed_at).cmp(&date_ts(b.completed_at)),
        SortKey::ProcessName => a
            .process_name
            .to_lowercase()
            .cmp(&b.process_name.to_lowercase()),
        SortKey::SizeBytes => a.size_bytes.unwrap_or(0).cmp(&b.size_bytes.unwrap_or(0)),
    };
    let directed = match order {
        SortOrder::Asc => by_key,
        SortOrder::Desc => by_key.reverse(),
    };
    // Stable, reproducible order regardless of direction.
    directed.then_with(|| a.id.cmp(&b.id))
}

fn date_ts(date: Option<chrono::DateTime<chrono::Utc>>) -> i64 {
    date.map(|d| d.timestamp_millis()).unwrap_or(0)
}

/// Bucket an already-sorted sequence.
///
/// Bucket iteration order follows first appearance in the sorted input, so
/// the most sort-relevant bucket comes first. Documents keep their sorted
/// order inside each bucket.
pub fn group_documents(sorted: &[DocumentItem], group_by: GroupBy) -> Vec<DocumentGroup> {
    let mut groups: Vec<DocumentGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for doc in sorted {
        let (key, label) = match group_by {
            GroupBy::Process => (doc.process_id.clone(), doc.process_name.clone()),
            GroupBy::Month => (doc.month_label.clone(), doc.month_label.clone()),
        };
        match index.get(&key) {
            Some(&i) => groups[i].documents.push(doc.clone()),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(DocumentGroup {
                    key,
                    label,
                    documents: vec![doc.clone()],
                });
            }
        }
    }

    groups
}
