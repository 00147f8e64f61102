use chrono::NaiveDate;
use core::fmt::{Display, Formatter};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A constraint on a created or closed date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateConstraint {
    /// Inclusive on both ends
    Between(NaiveDate, NaiveDate),

    /// Strictly before the date
    Before(NaiveDate),

    /// On the date or any later date
    OnOrAfter(NaiveDate),
}

impl DateConstraint {
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            Self::Between(start, end) => start <= date && date <= end,
            Self::Before(bound) => date < bound,
            Self::OnOrAfter(bound) => date >= bound,
        }
    }
}

impl Display for DateConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Between(start, end) => write!(f, "{}..{}", start.format(DATE_FORMAT), end.format(DATE_FORMAT)),
            Self::Before(bound) => write!(f, "<{}", bound.format(DATE_FORMAT)),
            Self::OnOrAfter(bound) => write!(f, ">={}", bound.format(DATE_FORMAT)),
        }
    }
}
