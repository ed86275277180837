//! Explorer scope: the client/date-range tuple bounding visibility.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The (client, date range) tuple bounding which documents are visible and
/// cacheable. Sessions, caches, and selections are owned by exactly one
/// scope; a scope change means constructing a fresh session, so signed URLs
/// and selections can never leak between clients or date ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerScope {
    pub client_id: String,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl ExplorerScope {
    pub fn new(
        client_id: impl Into<String>,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            date_from,
            date_to,
        }
    }

    /// A scope without a client cannot list anything.
    pub fn is_valid(&self) -> bool {
        !self.client_id.trim().is_empty()
    }
}

impl std::fmt::Display for ExplorerScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client {}", self.client_id)?;
        if let Some(from) = self.date_from {
            write!(f, " from {}", from)?;
        }
        if let Some(to) = self.date_to {
            write!(f, " to {}", to)?;
        }
        Ok(())
    }
}
