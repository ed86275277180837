//! Per-process summaries for the explorer sidebar.

use std::collections::HashMap;

use crate::models::DocumentItem;

/// Document count for one month bucket inside a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthCount {
    pub month_label: String,
    pub count: usize,
}

/// Aggregate view of one process across the visible collection.
#[derive(Debug, Clone)]
pub struct ProcessSummary {
    pub process_id: String,
    pub process_name: String,
    pub total: usize,
    /// Month buckets in first-appearance order.
    pub months: Vec<MonthCount>,
}

/// Summarize the visible collection per process, preserving the order in
/// which processes (and their months) first appear.
pub fn process_summaries(documents: &[DocumentItem]) -> Vec<ProcessSummary> {
    let mut summaries: Vec<ProcessSummary> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for doc in documents {
        let i = match index.get(&doc.process_id) {
            Some(&i) => i,
            None => {
                index.insert(doc.process_id.clone(), summaries.len());
                summaries.push(ProcessSummary {
                    process_id: doc.process_id.clone(),
                    process_name: doc.process_name.clone(),
                    total: 0,
                    months: Vec::new(),
                });
                summaries.len() - 1
            }
        };

        let summary = &mut summaries[i];
        summary.total += 1;
        match summary
            .months
            .iter_mut()
            .find(|m| m.month_label == doc.month_label)
        {
            Some(month) => month.count += 1,
            None => summary.months.push(MonthCount {
                month_label: doc.month_label.clone(),
                count: 1,
            }),
        }
    }

    summaries
}
