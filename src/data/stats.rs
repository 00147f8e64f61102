use super::{Inconsistency, Metric};
use serde::Serialize;
use strum::IntoEnumIterator;

/// The metric record produced by one strategy run.
///
/// Each strategy builds exactly one `Stats` value once all of its partial results are known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub team_created: u64,
    pub community_created: u64,
    pub closed_as_duplicates: u64,
    pub closed_as_questions: u64,
    pub closed_as_declined: u64,
    pub closed_as_enhancements: u64,
    pub closed_as_port: u64,
    pub closed_as_bug: u64,
    pub closed_as_task: u64,
    pub closed_as_documentation: u64,
}

impl Stats {
    #[must_use]
    pub const fn get(&self, metric: Metric) -> u64 {
        match metric {
            Metric::TeamCreated => self.team_created,
            Metric::CommunityCreated => self.community_created,
            Metric::ClosedAsDuplicates => self.closed_as_duplicates,
            Metric::ClosedAsQuestions => self.closed_as_questions,
            Metric::ClosedAsDeclined => self.closed_as_declined,
            Metric::ClosedAsEnhancements => self.closed_as_enhancements,
            Metric::ClosedAsPort => self.closed_as_port,
            Metric::ClosedAsBug => self.closed_as_bug,
            Metric::ClosedAsTask => self.closed_as_task,
            Metric::ClosedAsDocumentation => self.closed_as_documentation,
        }
    }

    /// Lists every metric whose value differs between `self` and `other`, in [`Metric`] order.
    #[must_use]
    pub fn diff(&self, other: &Self) -> Vec<Inconsistency> {
        Metric::iter()
            .filter_map(|metric| {
                let left = self.get(metric);
                let right = other.get(metric);
                (left != right).then_some(Inconsistency { metric, left, right })
            })
            .collect()
    }
}
