use crate::data::Issue;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

pub fn timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().to_utc()
}

/// An open issue created at noon UTC on the given date.
pub fn issue(number: u64, author: &str, created: &str) -> Issue {
    Issue {
        number,
        author: author.to_string(),
        created_at: timestamp(&format!("{created}T12:00:00Z")),
        closed_at: None,
        labels: BTreeSet::new(),
        participants: BTreeSet::new(),
        milestone: None,
        is_pull_request: false,
    }
}

pub fn closed(issue: Issue, closed: &str) -> Issue {
    Issue {
        closed_at: Some(timestamp(&format!("{closed}T12:00:00Z"))),
        ..issue
    }
}

pub fn labeled(issue: Issue, labels: &[&str]) -> Issue {
    Issue {
        labels: labels.iter().map(ToString::to_string).collect(),
        ..issue
    }
}

pub fn milestoned(issue: Issue, milestone: &str) -> Issue {
    Issue {
        milestone: Some(milestone.to_string()),
        ..issue
    }
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}
