//! Impact scoring and advanced report ordering.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::models::{AdvancedFlakyTestReport, ExecutionRecord, ImpactScore, SortBy};

pub const FLAKINESS_WEIGHT: f64 = 0.6;
pub const IMPACT_WEIGHT: f64 = 0.4;

/// Which runs each identifier broke, out of every run in the fetched set.
#[derive(Debug, Default)]
pub struct RunIndex<'a> {
    total_runs: usize,
    failing_runs: HashMap<&'a str, HashSet<Uuid>>,
}

impl<'a> RunIndex<'a> {
    pub fn build(records: &'a [ExecutionRecord]) -> Self {
        let mut all_runs = HashSet::new();
        let mut failing_runs: HashMap<&str, HashSet<Uuid>> = HashMap::new();

        for record in records {
            all_runs.insert(record.execution.test_run_id);
            if record.status().is_failure() {
                failing_runs
                    .entry(record.identifier())
                    .or_default()
                    .insert(record.execution.test_run_id);
            }
        }

        Self {
            total_runs: all_runs.len(),
            failing_runs,
        }
    }

    pub fn total_runs(&self) -> usize {
        self.total_runs
    }

    /// Runs with at least one failing execution of `identifier`.
    pub fn runs_affected(&self, identifier: &str) -> usize {
        self.failing_runs.get(identifier).map_or(0, HashSet::len)
    }

    pub fn impact_for(&self, identifier: &str, flakiness_score: f64) -> ImpactScore {
        let runs_affected = self.runs_affected(identifier);
        let impact_percentage = if self.total_runs == 0 {
            0.0
        } else {
            runs_affected as f64 / self.total_runs as f64 * 100.0
        };

        ImpactScore {
            runs_affected,
            total_runs: self.total_runs,
            impact_percentage,
            impact_score: flakiness_score * FLAKINESS_WEIGHT + impact_percentage * IMPACT_WEIGHT,
        }
    }
}

/// Sort descending by `sort_by`. Equal keys keep their current order.
pub fn sort_reports(reports: &mut [AdvancedFlakyTestReport], sort_by: SortBy) {
    let key = |r: &AdvancedFlakyTestReport| match sort_by {
        SortBy::FlakinessScore => r.base.flakiness_score,
        SortBy::Impact => r.impact.impact_score,
        SortBy::FailureRate => r.base.failure_rate,
    };
    reports.sort_by(|a, b| key(b).total_cmp(&key(a)));
}
