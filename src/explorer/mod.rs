//! Document explorer engine: filtering, arrangement, selection, sessions.

mod arrange;
mod filter;
mod selection;
mod session;
mod summary;

pub use arrange::{
    group_documents, sort_documents, DocumentGroup, GroupBy, SortKey, SortOrder, ViewMode,
    ViewState,
};
pub use filter::{filter_documents, FilterState};
pub use selection::SelectionManager;
pub use session::ExplorerSession;
pub use summary::{process_summaries, MonthCount, ProcessSummary};

#[cfg(test)]
pub(crate) mod test_support {
    //! Document fixtures shared by the engine tests.

    use chrono::{DateTime, Utc};

    use crate::models::{self, DocKind, DocumentItem};

    /// Document with a month label but no concrete dates.
    pub fn doc(
        id: &str,
        process_id: &str,
        process_name: &str,
        month_label: &str,
        file_name: &str,
    ) -> DocumentItem {
        DocumentItem {
            id: id.to_string(),
            display_title: models::display_title(process_name, month_label),
            file_name: file_name.to_string(),
            mime_type: "application/pdf".into(),
            size_bytes: Some(4096),
            process_id: process_id.to_string(),
            process_name: process_name.to_string(),
            doc_kind: DocKind::Pdf,
            payment_period: None,
            month_label: month_label.to_string(),
            month_value: String::new(),
            original_date: None,
            completed_at: None,
            accountant: None,
        }
    }

    /// Document with explicit dates; month label derived from them.
    pub fn doc_dated(
        id: &str,
        process_id: &str,
        process_name: &str,
        original_date: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
    ) -> DocumentItem {
        let bucket = original_date.or(completed_at);
        let month_label = models::month_label(bucket);
        DocumentItem {
            id: id.to_string(),
            display_title: models::display_title(process_name, &month_label),
            file_name: format!("{id}.pdf"),
            mime_type: "application/pdf".into(),
            size_bytes: Some(4096),
            process_id: process_id.to_string(),
            process_name: process_name.to_string(),
            doc_kind: DocKind::Pdf,
            payment_period: None,
            month_label,
            month_value: models::month_value(bucket),
            original_date,
            completed_at,
            accountant: None,
        }
    }
}
