//! Document filter engine.
//!
//! Evaluates a composable predicate over the materialized document
//! collection. Filtering is a pure function of (documents, filter state):
//! criteria combine with AND across dimensions, membership within a set
//! dimension is OR, and an empty criterion places no restriction on its
//! dimension.

use crate::models::{DocKind, DocumentItem, PaymentPeriod};

/// The composable predicate, one independent criterion per dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    /// Case-insensitive substring match over display title and filename.
    pub search: String,
    /// Allowed document kinds.
    pub doc_kinds: Vec<DocKind>,
    /// Allowed payment periods.
    pub payment_periods: Vec<PaymentPeriod>,
    /// Allowed process ids.
    pub selected_processes: Vec<String>,
    /// Allowed month bucket labels.
    pub selected_months: Vec<String>,
}

impl FilterState {
    /// True when no dimension restricts anything.
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.doc_kinds.is_empty()
            && self.payment_periods.is_empty()
            && self.selected_processes.is_empty()
            && self.selected_months.is_empty()
    }
}

/// Apply the filter, preserving input order.
pub fn filter_documents(documents: &[DocumentItem], state: &FilterState) -> Vec<DocumentItem> {
    documents
        .iter()
        .filter(|doc| matches(doc, state))
        .cloned()
        .collect()
}

fn matches(doc: &DocumentItem, state: &FilterState) -> bool {
    let search = state.search.trim();
    if !search.is_empty() {
        let needle = search.to_lowercase();
        let in_title = doc.display_title.to_lowercase().contains(&needle);
        let in_file = doc.file_name.to_lowercase().contains(&needle);
        if !in_title && !in_file {
            return false;
        }
    }

    if !state.doc_kinds.is_empty() && !state.doc_kinds.contains(&doc.doc_kind) {
        return false;
    }

    if !state.payment_periods.is_empty() {
        match doc.payment_period {
            Some(period) if state.payment_periods.contains(&period) => {}
            _ => return false,
        }
    }

    if !state.selected_processes.is_empty() && !state.selected_processes.contains(&doc.process_id) {
        return false;
    }

    if !state.selected_months.is_empty() && !state.selected_months.contains(&doc.month_label) {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::test_support::doc;

    fn sample() -> Vec<DocumentItem> {
        vec![
            doc("f1", "p-imss", "IMSS", "ene 2024", "imss_enero.pdf"),
            doc("f2", "p-imss", "IMSS", "feb 2024", "imss_febrero.pdf"),
            doc("f3", "p-isr", "ISR", "ene 2024", "isr_enero.pdf"),
            doc("f4", "p-iva", "IVA", "mar 2024", "iva_marzo.jpg"),
        ]
    }

    fn ids(docs: &[DocumentItem]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let docs = sample();
        let out = filter_documents(&docs, &FilterState::default());
        assert_eq!(ids(&out), ids(&docs));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let docs = sample();
        let state = FilterState {
            search: "IMSS".into(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_documents(&docs, &state)), vec!["f1", "f2"]);

        // Matches filenames too.
        let state = FilterState {
            search: "MARZO".into(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_documents(&docs, &state)), vec!["f4"]);
    }

    #[test]
    fn test_or_within_dimension() {
        let docs = sample();
        let state = FilterState {
            selected_processes: vec!["p-imss".into(), "p-iva".into()],
            ..Default::default()
        };
        assert_eq!(ids(&filter_documents(&docs, &state)), vec!["f1", "f2", "f4"]);
    }

    #[test]
    fn test_and_across_dimensions() {
        // Processes AND months must both hold, not either.
        let docs = sample();
        let state = FilterState {
            selected_processes: vec!["p-imss".into(), "p-isr".into()],
            selected_months: vec!["ene 2024".into()],
            ..Default::default()
        };
        assert_eq!(ids(&filter_documents(&docs, &state)), vec!["f1", "f3"]);
    }

    #[test]
    fn test_kind_filter() {
        let mut docs = sample();
        docs[3].doc_kind = DocKind::Image;
        let state = FilterState {
            doc_kinds: vec![DocKind::Image],
            ..Default::default()
        };
        assert_eq!(ids(&filter_documents(&docs, &state)), vec!["f4"]);
    }

    #[test]
    fn test_period_filter_skips_unknown_periods() {
        let mut docs = sample();
        docs[0].payment_period = Some(PaymentPeriod::Monthly);
        docs[1].payment_period = None;
        let state = FilterState {
            payment_periods: vec![PaymentPeriod::Monthly],
            ..Default::default()
        };
        let out = filter_documents(&docs, &state);
        assert_eq!(ids(&out), vec!["f1"]);
    }

    #[test]
    fn test_added_criterion_narrows_monotonically() {
        let docs = sample();
        let mut state = FilterState {
            selected_processes: vec!["p-imss".into()],
            ..Default::default()
        };
        let first = filter_documents(&docs, &state);

        state.selected_months = vec!["feb 2024".into()];
        let second = filter_documents(&docs, &state);

        assert!(second.len() <= first.len());
        for doc in &second {
            assert!(first.iter().any(|d| d.id == doc.id));
        }
    }
}
