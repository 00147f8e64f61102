//! Runs both strategies against the same port and reconciles their results.
//!
//! The in-memory result is canonical. Every metric on which the query-composition result
//! disagrees is logged at warn level and returned as an [`Inconsistency`]; a disagreement never
//! fails the run.

use crate::Result;
use crate::data::{Inconsistency, Stats};
use crate::port::SearchPort;
use crate::strategy::{InMemory, QueryComposition, StatsRequest, StatsStrategy};
use ohno::EnrichableExt;
use serde::Serialize;

const LOG_TARGET: &str = " reconcile";

/// The canonical metrics of a run plus every detected disagreement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub stats: Stats,
    pub inconsistencies: Vec<Inconsistency>,
}

impl Reconciliation {
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.inconsistencies.is_empty()
    }
}

/// Computes [`Stats`] with both strategies concurrently and reconciles them.
///
/// # Errors
///
/// Fails if either strategy fails. No partial result is returned.
pub async fn compute_stats<P: SearchPort>(port: &P, request: &StatsRequest) -> Result<Reconciliation> {
    reconcile(
        &InMemory::new(port),
        &QueryComposition::new(port, request.max_in_flight),
        request,
    )
    .await
}

/// Runs `canonical` and `reference` concurrently and diffs their results.
///
/// The canonical strategy's [`Stats`] are returned as-is.
pub async fn reconcile<C, R>(canonical: &C, reference: &R, request: &StatsRequest) -> Result<Reconciliation>
where
    C: StatsStrategy,
    R: StatsStrategy,
{
    log::info!(
        target: LOG_TARGET,
        "Computing stats for {}/{} over {} using the {} and {} strategies",
        request.org,
        request.name,
        request.window,
        canonical.name(),
        reference.name()
    );

    let (stats, reference_stats) = tokio::try_join!(
        async {
            canonical
                .compute(request)
                .await
                .map_err(|e| e.enrich_with(|| format!("computing stats with the {} strategy", canonical.name())))
        },
        async {
            reference
                .compute(request)
                .await
                .map_err(|e| e.enrich_with(|| format!("computing stats with the {} strategy", reference.name())))
        },
    )?;

    let inconsistencies = stats.diff(&reference_stats);
    for inconsistency in &inconsistencies {
        log::warn!(
            target: LOG_TARGET,
            "Inconsistent {}: {} strategy reports {}, {} strategy reports {}",
            inconsistency.metric,
            canonical.name(),
            inconsistency.left,
            reference.name(),
            inconsistency.right
        );
    }

    Ok(Reconciliation { stats, inconsistencies })
}
