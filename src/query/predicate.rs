use super::DateConstraint;
use crate::Result;
use crate::data::{DateWindow, Issue};
use core::fmt::{Display, Formatter};
use ohno::bail;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Restricts results by milestone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MilestoneFilter {
    #[default]
    Any,
    NoMilestone,
}

/// Restricts results by open/closed state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StateFilter {
    #[default]
    Any,
    Open,
    Closed,
}

/// Restricts results to issues or pull requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TypeFilter {
    #[default]
    Any,
    Issue,
    PullRequest,
}

/// An immutable search filter over one repository.
///
/// Label sets are shared between derived predicates and copied on write, so deriving a new
/// predicate never changes one that already exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPredicate {
    repository: Arc<str>,
    created: Option<DateConstraint>,
    closed: Option<DateConstraint>,
    author: Option<Arc<str>>,
    labels: Arc<BTreeSet<String>>,
    excluded_labels: Arc<BTreeSet<String>>,
    milestone: MilestoneFilter,
    state: StateFilter,
    kind: TypeFilter,
}

impl QueryPredicate {
    /// Creates an unconstrained predicate over `org/name`.
    ///
    /// # Errors
    ///
    /// Fails if either the organization or the repository name is empty.
    pub fn new(org: &str, name: &str) -> Result<Self> {
        if org.trim().is_empty() {
            bail!("repository owner must not be empty");
        }

        if name.trim().is_empty() {
            bail!("repository name must not be empty");
        }

        Ok(Self {
            repository: Arc::from(format!("{org}/{name}")),
            created: None,
            closed: None,
            author: None,
            labels: Arc::default(),
            excluded_labels: Arc::default(),
            milestone: MilestoneFilter::Any,
            state: StateFilter::Any,
            kind: TypeFilter::Any,
        })
    }

    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }

    #[must_use]
    pub fn created(&self, constraint: DateConstraint) -> Self {
        Self {
            created: Some(constraint),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn created_in(&self, window: &DateWindow) -> Self {
        self.created(DateConstraint::Between(window.start(), window.end()))
    }

    #[must_use]
    pub fn closed(&self, constraint: DateConstraint) -> Self {
        Self {
            closed: Some(constraint),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn closed_in(&self, window: &DateWindow) -> Self {
        self.closed(DateConstraint::Between(window.start(), window.end()))
    }

    #[must_use]
    pub fn author(&self, login: &str) -> Self {
        Self {
            author: Some(Arc::from(login)),
            ..self.clone()
        }
    }

    /// Requires the label. Required labels are combined with AND.
    #[must_use]
    pub fn with_label(&self, label: &str) -> Self {
        let mut next = self.clone();
        let _ = Arc::make_mut(&mut next.labels).insert(label.to_string());
        next
    }

    /// Excludes issues carrying the label.
    #[must_use]
    pub fn without_label(&self, label: &str) -> Self {
        let mut next = self.clone();
        let _ = Arc::make_mut(&mut next.excluded_labels).insert(label.to_string());
        next
    }

    #[must_use]
    pub fn without_milestone(&self) -> Self {
        Self {
            milestone: MilestoneFilter::NoMilestone,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn state(&self, state: StateFilter) -> Self {
        Self { state, ..self.clone() }
    }

    #[must_use]
    pub fn kind(&self, kind: TypeFilter) -> Self {
        Self { kind, ..self.clone() }
    }

    /// Renders the predicate in GitHub search syntax.
    ///
    /// Terms always appear in the same order, whatever order the predicate was assembled in.
    #[must_use]
    pub fn build(&self) -> String {
        let mut terms = vec![format!("repo:{}", self.repository)];

        if let Some(created) = &self.created {
            terms.push(format!("created:{created}"));
        }

        if let Some(closed) = &self.closed {
            terms.push(format!("closed:{closed}"));
        }

        if let Some(author) = &self.author {
            terms.push(format!("author:{author}"));
        }

        terms.extend(self.labels.iter().map(|label| format!("label:{}", quoted(label))));
        terms.extend(self.excluded_labels.iter().map(|label| format!("-label:{}", quoted(label))));

        if self.milestone == MilestoneFilter::NoMilestone {
            terms.push("no:milestone".to_string());
        }

        match self.state {
            StateFilter::Open => terms.push("is:open".to_string()),
            StateFilter::Closed => terms.push("is:closed".to_string()),
            StateFilter::Any => {}
        }

        match self.kind {
            TypeFilter::Issue => terms.push("is:issue".to_string()),
            TypeFilter::PullRequest => terms.push("is:pr".to_string()),
            TypeFilter::Any => {}
        }

        terms.join(" ")
    }

    /// Evaluates the predicate against an issue of this repository.
    ///
    /// Dates are compared on their UTC calendar date. A closed-date constraint never matches an open issue.
    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        if let Some(created) = &self.created
            && !created.contains(issue.created_at.date_naive())
        {
            return false;
        }

        if let Some(closed) = &self.closed {
            match issue.closed_at {
                Some(closed_at) if closed.contains(closed_at.date_naive()) => {}
                _ => return false,
            }
        }

        if let Some(author) = &self.author
            && issue.author != **author
        {
            return false;
        }

        if !self.labels.iter().all(|label| issue.labels.contains(label)) {
            return false;
        }

        if self.excluded_labels.iter().any(|label| issue.labels.contains(label)) {
            return false;
        }

        if self.milestone == MilestoneFilter::NoMilestone && issue.milestone.is_some() {
            return false;
        }

        let state_ok = match self.state {
            StateFilter::Any => true,
            StateFilter::Open => issue.is_open(),
            StateFilter::Closed => !issue.is_open(),
        };

        let kind_ok = match self.kind {
            TypeFilter::Any => true,
            TypeFilter::Issue => !issue.is_pull_request,
            TypeFilter::PullRequest => issue.is_pull_request,
        };

        state_ok && kind_ok
    }
}

impl Display for QueryPredicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.build())
    }
}

/// Wraps a label in double quotes, escaping embedded quotes and backslashes.
fn quoted(label: &str) -> String {
    format!("\"{}\"", label.replace('\\', "\\\\").replace('"', "\\\""))
}
