use super::{LOG_TARGET, StatsRequest, StatsStrategy};
use crate::Result;
use crate::data::{Issue, Roster, Stats};
use crate::port::SearchPort;
use ohno::EnrichableExt;

/// Computes metrics by fetching the window's issues once and filtering them locally.
///
/// Exactly two fetches are issued per run, concurrently: the issues created in the window and
/// the issues closed in the window.
#[derive(Debug, Clone, Copy)]
pub struct InMemory<'a, P> {
    port: &'a P,
}

impl<'a, P: SearchPort> InMemory<'a, P> {
    #[must_use]
    pub const fn new(port: &'a P) -> Self {
        Self { port }
    }
}

impl<P: SearchPort> StatsStrategy for InMemory<'_, P> {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    async fn compute(&self, request: &StatsRequest) -> Result<Stats> {
        let base = request.repository_predicate()?;
        let created_query = base.created_in(&request.window);
        let closed_query = base.closed_in(&request.window);

        let (created, closed) = tokio::try_join!(
            async {
                self.port
                    .fetch(&created_query)
                    .await
                    .map_err(|e| e.enrich_with(|| format!("fetching issues matching '{created_query}'")))
            },
            async {
                self.port
                    .fetch(&closed_query)
                    .await
                    .map_err(|e| e.enrich_with(|| format!("fetching issues matching '{closed_query}'")))
            },
        )?;

        log::debug!(
            target: LOG_TARGET,
            "Fetched {} issues created and {} issues closed in {}",
            created.len(),
            closed.len(),
            request.window
        );

        let labels = &request.labels;
        Ok(Stats {
            team_created: team_created(&created, &request.roster),
            community_created: inbound_volume(&created, &request.roster),
            closed_as_duplicates: output_volume_by_type(&closed, &labels.duplicates),
            closed_as_questions: output_volume_by_type(&closed, &labels.questions),
            closed_as_declined: output_volume_by_type(&closed, &labels.rejected),
            closed_as_enhancements: output_volume_by_type(&closed, &labels.enhancements),
            closed_as_port: output_volume_by_type(&closed, &labels.ports),
            closed_as_bug: output_volume_by_type(&closed, &labels.bugs),
            closed_as_task: output_volume_by_type(&closed, &labels.tasks),
            closed_as_documentation: output_volume_by_type(&closed, &labels.docs),
        })
    }
}

/// Issues authored by a team member.
#[must_use]
pub fn team_created(created: &[Issue], roster: &Roster) -> u64 {
    count_where(created, |issue| roster.is_member(&issue.author))
}

/// Issues authored by neither a team member nor a bot.
#[must_use]
pub fn inbound_volume(created: &[Issue], roster: &Roster) -> u64 {
    count_where(created, |issue| !roster.is_member(&issue.author) && !roster.is_bot(&issue.author))
}

/// Issues carrying at least one of `labels`. Each issue is counted at most once.
#[must_use]
pub fn output_volume_by_type(closed: &[Issue], labels: &[String]) -> u64 {
    count_where(closed, |issue| issue.has_any_label(labels))
}

fn count_where(issues: &[Issue], predicate: impl Fn(&Issue) -> bool) -> u64 {
    issues.iter().filter(|issue| predicate(issue)).count() as u64
}
