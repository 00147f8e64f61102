use serde::Serialize;
use strum::{Display, EnumIter};

/// The ten counters carried by [`Stats`](super::Stats), in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, Serialize)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    TeamCreated,
    CommunityCreated,
    ClosedAsDuplicates,
    ClosedAsQuestions,
    ClosedAsDeclined,
    ClosedAsEnhancements,
    ClosedAsPort,
    ClosedAsBug,
    ClosedAsTask,
    ClosedAsDocumentation,
}

impl Metric {
    /// Human-readable label used by the console report.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::TeamCreated => "Created by the team",
            Self::CommunityCreated => "Created by the community",
            Self::ClosedAsDuplicates => "Closed as duplicates",
            Self::ClosedAsQuestions => "Closed as questions",
            Self::ClosedAsDeclined => "Closed as declined",
            Self::ClosedAsEnhancements => "Closed as enhancements",
            Self::ClosedAsPort => "Closed as ports",
            Self::ClosedAsBug => "Closed as bugs",
            Self::ClosedAsTask => "Closed as tasks",
            Self::ClosedAsDocumentation => "Closed as documentation",
        }
    }
}
