//! End-to-end tests running both strategies against an in-memory port

use chrono::{NaiveDate, TimeZone, Utc};
use issue_scorecard::data::{DateWindow, Issue, LabelTaxonomy, Metric, Roster, Stats};
use issue_scorecard::port::mock::{FailOn, MockPort};
use issue_scorecard::reconcile::reconcile;
use issue_scorecard::strategy::{InMemory, QueryComposition, StatsRequest, StatsStrategy};
use issue_scorecard::{Result, compute_stats};
use std::collections::BTreeSet;

fn at(date: &str) -> chrono::DateTime<Utc> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
}

fn issue(number: u64, author: &str, created: &str, closed: Option<&str>, labels: &[&str]) -> Issue {
    Issue {
        number,
        author: author.to_string(),
        created_at: at(created),
        closed_at: closed.map(at),
        labels: labels.iter().map(ToString::to_string).collect(),
        participants: BTreeSet::new(),
        milestone: None,
        is_pull_request: false,
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn request() -> StatsRequest {
    let window = DateWindow::parse("2020-01-01", "2020-01-31").unwrap();
    let roster = Roster {
        members: strings(&["alice", "bob"]),
        bots: strings(&["bot1"]),
    };
    let labels = LabelTaxonomy {
        bugs: strings(&["bug", "regression"]),
        docs: strings(&["docs"]),
        rejected: strings(&["declined"]),
        duplicates: strings(&["duplicate"]),
        ..LabelTaxonomy::default()
    };
    StatsRequest::new("acme", "widgets", window, roster, labels).with_max_in_flight(2)
}

fn repository() -> Vec<Issue> {
    vec![
        issue(1, "alice", "2020-01-02", Some("2020-01-05"), &["bug"]),
        issue(2, "bob", "2020-01-03", None, &[]),
        issue(3, "bot1", "2020-01-04", Some("2020-01-10"), &["docs"]),
        issue(4, "carol", "2020-01-05", Some("2020-01-06"), &["regression"]),
        issue(5, "dave", "2020-01-06", Some("2020-01-20"), &["declined"]),
        issue(6, "erin", "2020-01-07", None, &["bug"]),
        issue(7, "frank", "2020-01-31", Some("2020-02-03"), &["bug"]),
        issue(8, "carol", "2019-12-20", Some("2020-01-02"), &["duplicate"]),
        issue(9, "alice", "2019-12-01", Some("2019-12-30"), &["bug"]),
        issue(10, "gina", "2020-02-01", Some("2020-02-01"), &["docs"]),
    ]
}

/// Wraps a strategy and reports one more team-created issue than it computed.
struct Skewed<S>(S);

impl<S: StatsStrategy> StatsStrategy for Skewed<S> {
    fn name(&self) -> &'static str {
        "skewed"
    }

    async fn compute(&self, request: &StatsRequest) -> Result<Stats> {
        let mut stats = self.0.compute(request).await?;
        stats.team_created += 1;
        Ok(stats)
    }
}

#[tokio::test]
async fn test_strategies_agree_on_consistent_data() {
    let port = MockPort::new(repository());

    let result = compute_stats(&port, &request()).await.unwrap();

    assert!(result.is_consistent(), "{:?}", result.inconsistencies);
    assert_eq!(
        result.stats,
        Stats {
            team_created: 2,
            community_created: 4,
            closed_as_duplicates: 1,
            closed_as_declined: 1,
            closed_as_bug: 2,
            closed_as_documentation: 1,
            ..Stats::default()
        }
    );
}

#[tokio::test]
async fn test_output_volume_by_type_matches_across_strategies() {
    let port = MockPort::new(repository());
    let request = request();
    let closed_in_window = port
        .issues()
        .iter()
        .filter(|issue| issue.closed_at.is_some_and(|at| request.window.contains(at.date_naive())))
        .cloned()
        .collect::<Vec<_>>();

    let bug_labels = strings(&["bug", "regression"]);
    let composed = QueryComposition::new(&port, 2)
        .output_volume_by_type(&request, &bug_labels)
        .await
        .unwrap();
    let local = issue_scorecard::strategy::output_volume_by_type(&closed_in_window, &bug_labels);

    assert_eq!(composed, 2);
    assert_eq!(local, 2);
}

#[tokio::test]
async fn test_mismatch_is_reported_and_canonical_value_wins() {
    let port = MockPort::new(repository());
    let request = request();

    let result = reconcile(&InMemory::new(&port), &Skewed(QueryComposition::new(&port, 2)), &request)
        .await
        .unwrap();

    assert_eq!(result.stats.team_created, 2);
    assert_eq!(result.inconsistencies.len(), 1);
    let inconsistency = &result.inconsistencies[0];
    assert_eq!(inconsistency.metric, Metric::TeamCreated);
    assert_eq!(inconsistency.left, 2);
    assert_eq!(inconsistency.right, 3);
    assert_eq!(inconsistency.to_string(), "teamCreated(2 vs 3)");
}

#[tokio::test]
async fn test_count_failure_fails_the_run() {
    let port = MockPort::new(repository()).failing_on(FailOn::Count);
    let _ = compute_stats(&port, &request()).await.unwrap_err();
}

#[tokio::test]
async fn test_fetch_failure_fails_the_run() {
    let port = MockPort::new(repository()).failing_on(FailOn::Fetch);
    let _ = compute_stats(&port, &request()).await.unwrap_err();
}

#[tokio::test]
async fn test_volume_report_over_mock_repository() {
    let port = MockPort::new(repository());
    let report = QueryComposition::new(&port, 2).volume_report(&request()).await.unwrap();

    assert_eq!(report.inbound_volume, 4);
    assert_eq!(report.output_bugs, 2);
    assert_eq!(report.output_docs, 1);
}
