//! Domain models for the document explorer.

mod document;
mod scope;

pub use document::{
    display_title, month_label, month_value, DocKind, DocumentItem, PaymentPeriod, NO_DATE_LABEL,
};
pub use scope::ExplorerScope;
