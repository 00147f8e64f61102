use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An issue or pull request as returned by a port's fetch operation.
///
/// An issue is open exactly when `closed_at` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub labels: BTreeSet<String>,
    pub participants: BTreeSet<String>,
    pub milestone: Option<String>,
    pub is_pull_request: bool,
}

impl Issue {
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }

    /// Returns `true` if this issue carries at least one of the given labels.
    #[must_use]
    pub fn has_any_label<S: AsRef<str>>(&self, labels: &[S]) -> bool {
        labels.iter().any(|label| self.labels.contains(label.as_ref()))
    }
}
