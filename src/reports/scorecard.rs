use crate::data::{DateWindow, Inconsistency, Stats, VolumeReport};
use serde::Serialize;

/// Everything a `stats` run reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    /// `org/name`
    pub repository: String,
    pub window: DateWindow,

    /// Canonical metrics
    pub stats: Stats,

    /// Metrics on which the two strategies disagreed
    pub inconsistencies: Vec<Inconsistency>,

    pub volume: VolumeReport,
    pub assignable_users: Vec<String>,
}
