//! Core data types shared by both strategies.
//!
//! [`Issue`] is the record a port's fetch operation produces. [`Stats`] is the ten-counter
//! result each strategy assembles once, and [`Stats::diff`] turns two of them into a list of
//! [`Inconsistency`] values naming every [`Metric`] on which they disagree.

mod date_window;
mod inconsistency;
mod issue;
mod label_taxonomy;
mod metric;
mod roster;
mod stats;
mod volume_report;

pub use date_window::DateWindow;
pub use inconsistency::Inconsistency;
pub use issue::Issue;
pub use label_taxonomy::LabelTaxonomy;
pub use metric::Metric;
pub use roster::Roster;
pub use stats::Stats;
pub use volume_report::VolumeReport;
