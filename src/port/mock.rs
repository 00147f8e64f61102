//! In-memory search port.
//!
//! [`MockPort`] answers predicates by evaluating them locally against a fixed list of issues,
//! so counts and fetches always agree with each other. It records every predicate it serves
//! and can be told to fail either operation.

use super::SearchPort;
use crate::Result;
use crate::data::Issue;
use crate::query::QueryPredicate;
use ohno::bail;
use std::sync::{Arc, Mutex};

/// Which operation a [`MockPort`] should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Count,
    Fetch,
}

/// A recorded port call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Count(String),
    Fetch(String),
}

/// A search port backed by a list of issues.
///
/// Clones share the same recorded operations.
#[derive(Debug, Clone, Default)]
pub struct MockPort {
    issues: Arc<Vec<Issue>>,
    fail_on: Option<FailOn>,
    operations: Arc<Mutex<Vec<MockOperation>>>,
}

impl MockPort {
    #[must_use]
    pub fn new(issues: Vec<Issue>) -> Self {
        Self {
            issues: Arc::new(issues),
            fail_on: None,
            operations: Arc::default(),
        }
    }

    /// Makes every call of the given operation fail.
    #[must_use]
    pub fn failing_on(self, fail_on: FailOn) -> Self {
        Self {
            fail_on: Some(fail_on),
            ..self
        }
    }

    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Returns the calls served so far, in the order they arrived.
    #[must_use]
    pub fn operations(&self) -> Vec<MockOperation> {
        self.operations.lock().map(|ops| ops.clone()).unwrap_or_default()
    }

    fn record(&self, operation: MockOperation) {
        if let Ok(mut ops) = self.operations.lock() {
            ops.push(operation);
        }
    }
}

impl SearchPort for MockPort {
    async fn count(&self, predicate: &QueryPredicate) -> Result<u64> {
        self.record(MockOperation::Count(predicate.build()));
        if self.fail_on == Some(FailOn::Count) {
            bail!("mock count failure for query '{predicate}'");
        }

        Ok(self.issues.iter().filter(|issue| predicate.matches(issue)).count() as u64)
    }

    async fn fetch(&self, predicate: &QueryPredicate) -> Result<Vec<Issue>> {
        self.record(MockOperation::Fetch(predicate.build()));
        if self.fail_on == Some(FailOn::Fetch) {
            bail!("mock fetch failure for query '{predicate}'");
        }

        Ok(self.issues.iter().filter(|issue| predicate.matches(issue)).cloned().collect())
    }
}
