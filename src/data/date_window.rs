use crate::Result;
use chrono::NaiveDate;
use core::fmt::{Display, Formatter};
use ohno::bail;
use serde::Serialize;

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            bail!("date window start {start} is after its end {end}");
        }

        Ok(Self { start, end })
    }

    /// Parse a window from two ISO calendar dates (`YYYY-MM-DD`).
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let Ok(start_date) = NaiveDate::parse_from_str(start, "%Y-%m-%d") else {
            bail!("invalid start date '{start}', expected YYYY-MM-DD");
        };
        let Ok(end_date) = NaiveDate::parse_from_str(end, "%Y-%m-%d") else {
            bail!("invalid end date '{end}', expected YYYY-MM-DD");
        };

        Self::new(start_date, end_date)
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// The first date after the window, used for "closed later" queries.
    #[must_use]
    pub fn day_after_end(&self) -> NaiveDate {
        self.end.succ_opt().unwrap_or(self.end)
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Display for DateWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} -> {}", self.start, self.end)
    }
}
