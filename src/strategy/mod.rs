//! The two independent ways of computing [`Stats`].
//!
//! [`QueryComposition`] asks the port for many narrow counts and combines them arithmetically.
//! [`InMemory`] fetches the created and closed issues of the window once and reduces them
//! locally. For a consistent backend both produce identical results.

mod in_memory;
mod query_composition;

pub use in_memory::{InMemory, inbound_volume, output_volume_by_type, team_created};
pub use query_composition::QueryComposition;

use crate::Result;
use crate::data::{DateWindow, LabelTaxonomy, Roster, Stats};
use crate::query::QueryPredicate;

pub(crate) const LOG_TARGET: &str = "  strategy";

/// Default ceiling on concurrently outstanding count queries.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

/// Everything a strategy needs to compute one [`Stats`] record.
#[derive(Debug, Clone)]
pub struct StatsRequest {
    pub org: String,
    pub name: String,
    pub window: DateWindow,
    pub roster: Roster,
    pub labels: LabelTaxonomy,

    /// Ceiling on port calls the query-composition strategy of [`compute_stats`](crate::compute_stats) keeps
    /// outstanding at once, across all of its metrics
    pub max_in_flight: usize,
}

impl StatsRequest {
    #[must_use]
    pub fn new(org: impl Into<String>, name: impl Into<String>, window: DateWindow, roster: Roster, labels: LabelTaxonomy) -> Self {
        Self {
            org: org.into(),
            name: name.into(),
            window,
            roster,
            labels,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    #[must_use]
    pub fn with_max_in_flight(self, max_in_flight: usize) -> Self {
        Self { max_in_flight, ..self }
    }

    /// An unconstrained predicate over the requested repository.
    pub fn repository_predicate(&self) -> Result<QueryPredicate> {
        QueryPredicate::new(&self.org, &self.name)
    }
}

/// One way of computing [`Stats`] for a request.
pub trait StatsStrategy: Send + Sync {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    fn compute(&self, request: &StatsRequest) -> impl Future<Output = Result<Stats>> + Send;
}
