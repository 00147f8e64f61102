use super::{LOG_TARGET, StatsRequest, StatsStrategy};
use crate::Result;
use crate::data::{Stats, VolumeReport};
use crate::port::SearchPort;
use crate::query::{DateConstraint, QueryPredicate, StateFilter};
use futures::stream::{self, StreamExt, TryStreamExt};
use ohno::{EnrichableExt, IntoAppError, app_err};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{OnceCell, Semaphore};

/// Computes metrics by composing narrow server-side counts.
///
/// Every count issued through one instance shares a single ceiling of `max_in_flight`
/// outstanding port calls, however many metrics are being computed concurrently. Each distinct
/// search string is counted at most once per instance, so computing [`Stats`] and the
/// [`VolumeReport`] with the same instance reuses the overlapping counts. The first failing
/// count aborts the whole computation.
#[derive(Debug)]
pub struct QueryComposition<'a, P> {
    port: &'a P,
    max_in_flight: usize,
    permits: Semaphore,
    counts: Mutex<HashMap<String, Arc<OnceCell<u64>>>>,
}

impl<'a, P: SearchPort> QueryComposition<'a, P> {
    #[must_use]
    pub fn new(port: &'a P, max_in_flight: usize) -> Self {
        let max_in_flight = max_in_flight.max(1);
        Self {
            port,
            max_in_flight,
            permits: Semaphore::new(max_in_flight),
            counts: Mutex::default(),
        }
    }

    /// Issues created in the window by any of the team members.
    pub async fn team_created(&self, request: &StatsRequest) -> Result<u64> {
        self.created_by(request, &request.roster.members).await
    }

    /// Issues created in the window, minus those created by team members or bots.
    pub async fn inbound_volume(&self, request: &StatsRequest) -> Result<u64> {
        let (created, team, bots) = tokio::try_join!(
            self.created(request),
            self.created_by(request, &request.roster.members),
            self.created_by(request, &request.roster.bots),
        )?;

        Ok(inbound(created, team, bots))
    }

    /// Issues closed in the window carrying a rejection label.
    pub async fn rejections(&self, request: &StatsRequest) -> Result<u64> {
        self.output_volume_by_type(request, &request.labels.rejected).await
    }

    /// Issues created in the window, minus those created and closed in the window without a milestone.
    pub async fn adjusted_inbound_volume(&self, request: &StatsRequest) -> Result<u64> {
        let (created, discarded) = tokio::try_join!(self.created(request), self.created_and_closed_without_milestone(request))?;
        Ok(subtract("adjusted inbound volume", created, discarded))
    }

    /// Issues created and closed in the window with a milestone, minus back/forward-ports.
    pub async fn output_volume(&self, request: &StatsRequest) -> Result<u64> {
        let (closed, discarded, ports) = tokio::try_join!(
            self.created_and_closed(request),
            self.created_and_closed_without_milestone(request),
            self.output_volume_by_type(request, &request.labels.ports),
        )?;

        Ok(subtract("output volume", subtract("output volume", closed, discarded), ports))
    }

    /// Sum over `labels` of the issues closed in the window carrying that label.
    ///
    /// An issue carrying several of the labels is counted once per label.
    pub async fn output_volume_by_type(&self, request: &StatsRequest, labels: &[String]) -> Result<u64> {
        let base = request.repository_predicate()?.closed_in(&request.window);
        let predicates: Vec<_> = labels.iter().map(|label| base.with_label(label)).collect();
        self.sum_counts(predicates).await
    }

    /// Issues created in the window that are still open, or were closed after the window ended.
    pub async fn still_open(&self, request: &StatsRequest) -> Result<u64> {
        let created = request.repository_predicate()?.created_in(&request.window);
        let (open, closed_later) = tokio::try_join!(
            self.count(created.state(StateFilter::Open)),
            self.count(created.closed(DateConstraint::OnOrAfter(request.window.day_after_end()))),
        )?;

        open.checked_add(closed_later).ok_or_else(|| app_err!("still-open count overflowed"))
    }

    /// Computes the composition-only volume figures.
    pub async fn volume_report(&self, request: &StatsRequest) -> Result<VolumeReport> {
        let (inbound_volume, rejections, adjusted_inbound_volume, output_volume, output_enhancements, output_bugs, output_tasks, output_docs, still_open) = tokio::try_join!(
            self.inbound_volume(request),
            self.rejections(request),
            self.adjusted_inbound_volume(request),
            self.output_volume(request),
            self.output_volume_by_type(request, &request.labels.enhancements),
            self.output_volume_by_type(request, &request.labels.bugs),
            self.output_volume_by_type(request, &request.labels.tasks),
            self.output_volume_by_type(request, &request.labels.docs),
            self.still_open(request),
        )?;

        Ok(VolumeReport {
            inbound_volume,
            rejections,
            adjusted_inbound_volume,
            output_volume,
            output_enhancements,
            output_bugs,
            output_tasks,
            output_docs,
            still_open,
        })
    }

    async fn created(&self, request: &StatsRequest) -> Result<u64> {
        self.count(request.repository_predicate()?.created_in(&request.window)).await
    }

    async fn created_by(&self, request: &StatsRequest, logins: &[String]) -> Result<u64> {
        let base = request.repository_predicate()?.created_in(&request.window);
        let predicates: Vec<_> = logins.iter().map(|login| base.author(login)).collect();
        self.sum_counts(predicates).await
    }

    async fn created_and_closed(&self, request: &StatsRequest) -> Result<u64> {
        let predicate = request
            .repository_predicate()?
            .created_in(&request.window)
            .closed_in(&request.window);
        self.count(predicate).await
    }

    async fn created_and_closed_without_milestone(&self, request: &StatsRequest) -> Result<u64> {
        let predicate = request
            .repository_predicate()?
            .created_in(&request.window)
            .closed_in(&request.window)
            .without_milestone();
        self.count(predicate).await
    }

    /// Counts the predicate once per instance, waiting for a free slot under the shared ceiling.
    async fn count(&self, predicate: QueryPredicate) -> Result<u64> {
        let search = predicate.build();
        let cell = {
            let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(counts.entry(search).or_default())
        };

        let count = cell
            .get_or_try_init(|| async {
                let _permit = self.permits.acquire().await.into_app_err("count limiter has been closed")?;
                log::debug!(target: LOG_TARGET, "Counting '{predicate}'");
                self.port
                    .count(&predicate)
                    .await
                    .map_err(|e| e.enrich_with(|| format!("counting issues matching '{predicate}'")))
            })
            .await?;

        Ok(*count)
    }

    async fn sum_counts(&self, predicates: Vec<QueryPredicate>) -> Result<u64> {
        stream::iter(predicates)
            .map(|predicate| self.count(predicate))
            .buffer_unordered(self.max_in_flight)
            .try_fold(0_u64, |total, count| async move {
                total.checked_add(count).ok_or_else(|| app_err!("issue count overflowed"))
            })
            .await
    }
}

impl<P: SearchPort> StatsStrategy for QueryComposition<'_, P> {
    fn name(&self) -> &'static str {
        "query composition"
    }

    async fn compute(&self, request: &StatsRequest) -> Result<Stats> {
        let overlap = request.roster.overlap();
        if !overlap.is_empty() {
            log::warn!(
                target: LOG_TARGET,
                "Logins listed as both team members and bots are subtracted twice from inbound volume: {}",
                overlap.join(", ")
            );
        }

        let labels = &request.labels;
        let (created, team, bots, duplicates, questions, declined, enhancements, ports, bugs, tasks, docs) = tokio::try_join!(
            self.created(request),
            self.created_by(request, &request.roster.members),
            self.created_by(request, &request.roster.bots),
            self.output_volume_by_type(request, &labels.duplicates),
            self.output_volume_by_type(request, &labels.questions),
            self.output_volume_by_type(request, &labels.rejected),
            self.output_volume_by_type(request, &labels.enhancements),
            self.output_volume_by_type(request, &labels.ports),
            self.output_volume_by_type(request, &labels.bugs),
            self.output_volume_by_type(request, &labels.tasks),
            self.output_volume_by_type(request, &labels.docs),
        )?;

        Ok(Stats {
            team_created: team,
            community_created: inbound(created, team, bots),
            closed_as_duplicates: duplicates,
            closed_as_questions: questions,
            closed_as_declined: declined,
            closed_as_enhancements: enhancements,
            closed_as_port: ports,
            closed_as_bug: bugs,
            closed_as_task: tasks,
            closed_as_documentation: docs,
        })
    }
}

fn inbound(created: u64, team: u64, bots: u64) -> u64 {
    subtract("inbound volume", subtract("inbound volume", created, team), bots)
}

/// Subtracts without going below zero. A clamp means the server-side counts disagree with each other.
fn subtract(what: &str, minuend: u64, subtrahend: u64) -> u64 {
    minuend.checked_sub(subtrahend).unwrap_or_else(|| {
        log::warn!(target: LOG_TARGET, "Clamped {what} to zero: {minuend} - {subtrahend} is negative");
        0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DateWindow, LabelTaxonomy, Roster};
    use crate::port::mock::{FailOn, MockPort, MockOperation};
    use crate::test_utils::{closed, issue, labeled, milestoned, strings};

    fn request(members: &[&str], bots: &[&str], labels: LabelTaxonomy) -> StatsRequest {
        StatsRequest::new(
            "org",
            "repo",
            DateWindow::parse("2020-01-01", "2020-01-31").unwrap(),
            Roster {
                members: strings(members),
                bots: strings(bots),
            },
            labels,
        )
        .with_max_in_flight(2)
    }

    #[test]
    fn test_subtract_saturates() {
        assert_eq!(subtract("x", 5, 3), 2);
        assert_eq!(subtract("x", 3, 5), 0);
        assert_eq!(inbound(10, 2, 1), 7);
        assert_eq!(inbound(1, 2, 0), 0);
    }

    #[tokio::test]
    async fn test_inbound_volume_subtracts_team_and_bots() {
        let mut issues = vec![
            issue(1, "alice", "2020-01-02"),
            issue(2, "alice", "2020-01-03"),
            issue(3, "bot1", "2020-01-04"),
            issue(4, "alice", "2019-12-31"),
        ];
        issues.extend((10..17).map(|n| issue(n, "someone", "2020-01-10")));

        let port = MockPort::new(issues);
        let strategy = QueryComposition::new(&port, 2);
        let request = request(&["alice"], &["bot1"], LabelTaxonomy::default());

        assert_eq!(strategy.team_created(&request).await.unwrap(), 2);
        assert_eq!(strategy.inbound_volume(&request).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_empty_lists_sum_to_zero_without_queries() {
        let port = MockPort::new(vec![issue(1, "alice", "2020-01-02")]);
        let strategy = QueryComposition::new(&port, 2);
        let request = request(&[], &[], LabelTaxonomy::default());

        assert_eq!(strategy.team_created(&request).await.unwrap(), 0);
        assert_eq!(strategy.output_volume_by_type(&request, &[]).await.unwrap(), 0);
        assert!(port.operations().is_empty());
    }

    #[tokio::test]
    async fn test_output_volume_by_type_counts_per_label() {
        let port = MockPort::new(vec![
            labeled(closed(issue(1, "a", "2019-11-01"), "2020-01-05"), &["bug"]),
            labeled(closed(issue(2, "a", "2020-01-02"), "2020-01-06"), &["bug", "regression"]),
            labeled(closed(issue(3, "a", "2020-01-02"), "2020-02-06"), &["bug"]),
            labeled(issue(4, "a", "2020-01-02"), &["bug"]),
        ]);
        let strategy = QueryComposition::new(&port, 2);
        let request = request(&[], &[], LabelTaxonomy::default());

        assert_eq!(strategy.output_volume_by_type(&request, &strings(&["bug"])).await.unwrap(), 2);
        assert_eq!(
            strategy
                .output_volume_by_type(&request, &strings(&["bug", "regression"]))
                .await
                .unwrap(),
            3
        );

        let ops = port.operations();
        assert!(ops.contains(&MockOperation::Count(
            "repo:org/repo closed:2020-01-01..2020-01-31 label:\"regression\"".to_string()
        )));
    }

    #[tokio::test]
    async fn test_volume_report() {
        let labels = LabelTaxonomy {
            enhancements: strings(&["enhancement"]),
            bugs: strings(&["bug"]),
            docs: strings(&["docs"]),
            rejected: strings(&["invalid"]),
            ports: strings(&["backport"]),
            ..LabelTaxonomy::default()
        };

        let port = MockPort::new(vec![
            // fixed in a release
            labeled(milestoned(closed(issue(1, "user", "2020-01-02"), "2020-01-10"), "1.0"), &["bug"]),
            labeled(milestoned(closed(issue(2, "user", "2020-01-03"), "2020-01-11"), "1.0"), &["enhancement"]),
            labeled(milestoned(closed(issue(3, "alice", "2020-01-04"), "2020-01-12"), "1.0"), &["backport"]),
            // triaged away
            labeled(closed(issue(4, "user", "2020-01-05"), "2020-01-06"), &["invalid"]),
            // closed after the window
            closed(issue(5, "user", "2020-01-20"), "2020-02-01"),
            // still open
            labeled(issue(6, "bot1", "2020-01-21"), &["docs"]),
            // created before the window
            labeled(milestoned(closed(issue(7, "user", "2019-12-01"), "2020-01-15"), "1.0"), &["docs"]),
        ]);

        let strategy = QueryComposition::new(&port, 2);
        let report = strategy.volume_report(&request(&["alice"], &["bot1"], labels)).await.unwrap();

        assert_eq!(
            report,
            VolumeReport {
                inbound_volume: 4,
                rejections: 1,
                adjusted_inbound_volume: 5,
                output_volume: 2,
                output_enhancements: 1,
                output_bugs: 1,
                output_tasks: 0,
                output_docs: 1,
                still_open: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_compute_fails_when_a_count_fails() {
        let port = MockPort::new(vec![]).failing_on(FailOn::Count);
        let strategy = QueryComposition::new(&port, 2);
        let _ = strategy.compute(&request(&["alice"], &[], LabelTaxonomy::default())).await.unwrap_err();
        assert!(!port.operations().is_empty());
    }

    #[tokio::test]
    async fn test_compute_rejects_empty_repository() {
        let port = MockPort::new(vec![]);
        let strategy = QueryComposition::new(&port, 2);
        let mut request = request(&[], &[], LabelTaxonomy::default());
        request.org = String::new();
        let _ = strategy.compute(&request).await.unwrap_err();
    }

    /// Port that tracks how many counts are outstanding at once.
    #[derive(Default)]
    struct PeakPort {
        active: core::sync::atomic::AtomicUsize,
        peak: core::sync::atomic::AtomicUsize,
    }

    impl SearchPort for PeakPort {
        async fn count(&self, _predicate: &QueryPredicate) -> Result<u64> {
            use core::sync::atomic::Ordering;

            let current = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            let _ = self.peak.fetch_max(current, Ordering::SeqCst);
            tokio::time::sleep(core::time::Duration::from_millis(5)).await;
            let _ = self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(1)
        }

        async fn fetch(&self, _predicate: &QueryPredicate) -> Result<Vec<crate::data::Issue>> {
            Ok(Vec::new())
        }
    }

    fn wide_labels() -> LabelTaxonomy {
        LabelTaxonomy {
            enhancements: strings(&["enhancement"]),
            bugs: strings(&["bug"]),
            tasks: strings(&["task"]),
            docs: strings(&["docs"]),
            duplicates: strings(&["duplicate"]),
            rejected: strings(&["invalid"]),
            ports: strings(&["backport"]),
            questions: strings(&["question"]),
        }
    }

    #[tokio::test]
    async fn test_ceiling_covers_every_concurrent_metric() {
        use core::sync::atomic::Ordering;

        let request = request(&["alice", "bob"], &["bot1", "bot2"], wide_labels());

        let port = PeakPort::default();
        let stats = QueryComposition::new(&port, 1).compute(&request).await.unwrap();
        assert_eq!(stats.team_created, 2);
        assert_eq!(port.peak.load(Ordering::SeqCst), 1);

        let port = PeakPort::default();
        let _ = QueryComposition::new(&port, 3).volume_report(&request).await.unwrap();
        assert!(port.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_overlapping_counts_are_issued_once() {
        let port = MockPort::new(vec![
            issue(1, "alice", "2020-01-02"),
            labeled(closed(issue(2, "user", "2020-01-03"), "2020-01-04"), &["bug"]),
        ]);
        let strategy = QueryComposition::new(&port, 2);
        let request = request(&["alice"], &["bot1"], wide_labels());

        let (stats, report) = tokio::try_join!(strategy.compute(&request), strategy.volume_report(&request)).unwrap();
        assert_eq!(stats.closed_as_bug, 1);
        assert_eq!(report.output_bugs, 1);
        assert_eq!(report.inbound_volume, stats.community_created);

        let searches: Vec<_> = port
            .operations()
            .into_iter()
            .map(|op| match op {
                MockOperation::Count(search) | MockOperation::Fetch(search) => search,
            })
            .collect();
        let distinct: std::collections::BTreeSet<_> = searches.iter().collect();
        assert_eq!(searches.len(), distinct.len(), "{searches:?}");
        assert!(searches.contains(&"repo:org/repo created:2020-01-01..2020-01-31".to_string()));
    }
}
