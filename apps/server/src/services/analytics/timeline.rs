//! Flakiness evolution over day/week/month periods.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use super::aggregation::percentage;
use super::bucketing::format_date;
use super::flakiness::count_status_changes;
use crate::models::{
    Aggregation, ExecutionRecord, ExecutionStatus, FlakinessTimelineEntry,
    FlakinessTimelineReport, FlakinessTimelineSummary, Timeframe,
};

struct Period {
    total_tests: usize,
    flaky_tests: usize,
    status_changes: usize,
}

impl Period {
    fn from_statuses(by_test: IndexMap<&str, Vec<ExecutionStatus>>) -> Self {
        let mut period = Self {
            total_tests: by_test.len(),
            flaky_tests: 0,
            status_changes: 0,
        };
        for statuses in by_test.into_values() {
            let changes = count_status_changes(statuses);
            if changes > 0 {
                period.flaky_tests += 1;
            }
            period.status_changes += changes;
        }
        period
    }

    fn flakiness_rate(&self) -> f64 {
        percentage(self.flaky_tests, self.total_tests)
    }
}

/// Bucket executions into periods and count flaky tests per period.
///
/// Status changes are only counted between executions that fall in the same
/// period. Periods are returned in ascending key order.
pub fn build_flakiness_timeline(
    records: &[ExecutionRecord],
    group_by: Timeframe,
    aggregation: Aggregation,
) -> FlakinessTimelineReport {
    let mut buckets: BTreeMap<String, IndexMap<&str, Vec<ExecutionStatus>>> = BTreeMap::new();
    for record in records {
        buckets
            .entry(format_date(record.run_created_at(), group_by))
            .or_default()
            .entry(record.identifier())
            .or_default()
            .push(record.status());
    }

    if buckets.is_empty() {
        return FlakinessTimelineReport::default();
    }

    let mut summary = FlakinessTimelineSummary {
        periods: buckets.len(),
        ..Default::default()
    };
    let mut rate_sum = 0.0;
    let mut timeline = Vec::with_capacity(buckets.len());

    for (date, by_test) in buckets {
        let period = Period::from_statuses(by_test);
        let rate = period.flakiness_rate();

        summary.total_tests = summary.total_tests.max(period.total_tests);
        summary.total_flaky_tests = summary.total_flaky_tests.max(period.flaky_tests);
        rate_sum += rate;

        let (flakiness_rate, average_status_change_rate) = match aggregation {
            Aggregation::Count => (None, None),
            Aggregation::Percentage => (
                Some(rate),
                Some(period.status_changes as f64 / period.total_tests as f64),
            ),
        };

        timeline.push(FlakinessTimelineEntry {
            date,
            total_tests: period.total_tests,
            flaky_tests: period.flaky_tests,
            status_changes: period.status_changes,
            flakiness_rate,
            average_status_change_rate,
        });
    }

    summary.average_flakiness_score = rate_sum / summary.periods as f64;
    FlakinessTimelineReport { timeline, summary }
}
