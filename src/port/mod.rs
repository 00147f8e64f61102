//! The count/fetch boundary between the statistics strategies and a search backend.
//!
//! The strategies only ever talk to a [`SearchPort`]. The GitHub transport in
//! [`crate::github`] implements it against the GraphQL API, and [`mock::MockPort`] implements it
//! over an in-memory list of issues for tests and offline runs.

pub mod mock;

use crate::Result;
use crate::data::Issue;
use crate::query::QueryPredicate;

/// A backend able to answer search predicates.
pub trait SearchPort: Send + Sync {
    /// Returns the number of issues and pull requests matching the predicate.
    fn count(&self, predicate: &QueryPredicate) -> impl Future<Output = Result<u64>> + Send;

    /// Returns every issue and pull request matching the predicate, deduplicated by number.
    ///
    /// A fetch either produces the complete result or fails as a whole.
    fn fetch(&self, predicate: &QueryPredicate) -> impl Future<Output = Result<Vec<Issue>>> + Send;
}
