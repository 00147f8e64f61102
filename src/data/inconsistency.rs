use super::Metric;
use core::fmt::{Display, Formatter};
use serde::Serialize;

/// A metric on which two strategies disagree.
///
/// `left` is the value from the canonical side of the comparison, `right` the value it was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Inconsistency {
    pub metric: Metric,
    pub left: u64,
    pub right: u64,
}

impl Display for Inconsistency {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}({} vs {})", self.metric, self.left, self.right)
    }
}
