//! Run and execution aggregation for trends reports.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use super::bucketing::format_date;
use crate::models::{
    DimensionStats, DurationStats, ExecutionRecord, ExecutionStatus, RunSummary,
    RunTimelineEntry, SlowTest, TestRun, Timeframe,
};

/// Nearest-rank percentile used for `p95`.
pub const P95_RANK: f64 = 0.95;
/// Label for runs missing a dimension value.
pub const UNKNOWN_DIMENSION: &str = "unknown";

/// `part / whole * 100`, or 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Success/failure summary over runs, using the all-executions-passed rule.
pub fn summarize_runs(runs: &[TestRun]) -> RunSummary {
    let total_runs = runs.len();
    if total_runs == 0 {
        return RunSummary::default();
    }

    let passed_runs = runs.iter().filter(|r| r.passed()).count();
    let total_duration: f64 = runs
        .iter()
        .map(|r| if r.duration.is_finite() && r.duration >= 0.0 { r.duration } else { 0.0 })
        .sum();

    RunSummary {
        total_runs,
        passed_runs,
        failed_runs: total_runs - passed_runs,
        success_rate: percentage(passed_runs, total_runs),
        failure_rate: percentage(total_runs - passed_runs, total_runs),
        average_duration: total_duration / total_runs as f64,
    }
}

/// Execution counts per status.
pub fn status_breakdown(records: &[ExecutionRecord]) -> BTreeMap<ExecutionStatus, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.status()).or_insert(0) += 1;
    }
    counts
}

/// Per-value success rates for one run attribute, sorted by value name.
pub fn dimension_stats<F>(runs: &[TestRun], value_of: F) -> Vec<DimensionStats>
where
    F: Fn(&TestRun) -> Option<&str>,
{
    let mut groups: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for run in runs {
        let name = value_of(run).unwrap_or(UNKNOWN_DIMENSION).to_string();
        let entry = groups.entry(name).or_insert((0, 0));
        entry.0 += 1;
        if run.passed() {
            entry.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(name, (total_runs, passed_runs))| DimensionStats {
            name,
            total_runs,
            passed_runs,
            failed_runs: total_runs - passed_runs,
            success_rate: percentage(passed_runs, total_runs),
        })
        .collect()
}

/// Runs bucketed by creation time, ascending by bucket key.
pub fn run_timeline(runs: &[TestRun], timeframe: Timeframe) -> Vec<RunTimelineEntry> {
    let mut buckets: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for run in runs {
        let entry = buckets
            .entry(format_date(run.created_at, timeframe))
            .or_insert((0, 0));
        entry.0 += 1;
        if run.passed() {
            entry.1 += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(date, (total_runs, passed_runs))| RunTimelineEntry {
            date,
            total_runs,
            passed_runs,
            failed_runs: total_runs - passed_runs,
            success_rate: percentage(passed_runs, total_runs),
        })
        .collect()
}

/// Min/max/average and nearest-rank p95 over durations.
///
/// Non-finite or negative values are skipped. Empty input yields zeros.
pub fn duration_stats<I>(durations: I) -> DurationStats
where
    I: IntoIterator<Item = f64>,
{
    let mut values: Vec<f64> = durations
        .into_iter()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .collect();
    if values.is_empty() {
        return DurationStats::default();
    }

    values.sort_by(f64::total_cmp);
    let n = values.len();
    let p95_index = ((n as f64 * P95_RANK).floor() as usize).min(n - 1);

    DurationStats {
        min: values[0],
        max: values[n - 1],
        average: values.iter().sum::<f64>() / n as f64,
        p95: values[p95_index],
    }
}

/// Tests with the highest average execution duration.
pub fn slowest_tests(records: &[ExecutionRecord], limit: usize) -> Vec<SlowTest> {
    struct Accumulator<'a> {
        name: &'a str,
        suite: Option<&'a str>,
        executions: usize,
        total: f64,
        max: f64,
    }

    let mut tests: IndexMap<&str, Accumulator<'_>> = IndexMap::new();
    for record in records {
        let Some(duration) = record
            .execution
            .duration
            .filter(|d| d.is_finite() && *d >= 0.0)
        else {
            continue;
        };
        let acc = tests.entry(record.identifier()).or_insert_with(|| Accumulator {
            name: &record.execution.name,
            suite: record.execution.suite.as_deref(),
            executions: 0,
            total: 0.0,
            max: 0.0,
        });
        acc.executions += 1;
        acc.total += duration;
        acc.max = acc.max.max(duration);
    }

    let mut slowest: Vec<SlowTest> = tests
        .into_iter()
        .map(|(identifier, acc)| SlowTest {
            identifier: identifier.to_string(),
            name: acc.name.to_string(),
            suite: acc.suite.map(str::to_string),
            executions: acc.executions,
            average_duration: acc.total / acc.executions as f64,
            max_duration: acc.max,
        })
        .collect();
    slowest.sort_by(|a, b| b.average_duration.total_cmp(&a.average_duration));
    slowest.truncate(limit);
    slowest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analytics::fixtures::{record, run, ts};
    use ExecutionStatus::{Failed, Passed, Skipped};

    #[test]
    fn test_empty_runs_summary_is_zeroed() {
        let summary = summarize_runs(&[]);

        assert_eq!(summary, RunSummary::default());
        assert_eq!(summary.success_rate, 0.0);
        assert!(!summary.average_duration.is_nan());
    }

    #[test]
    fn test_run_passes_only_when_all_executions_pass() {
        let runs = vec![
            run(ts(2023, 1, 15, 9), &[("a", Passed), ("b", Passed)]),
            run(ts(2023, 1, 15, 10), &[("a", Passed), ("b", Failed)]),
            run(ts(2023, 1, 16, 9), &[("a", Passed), ("b", Skipped)]),
            run(ts(2023, 1, 16, 10), &[("a", Passed)]),
        ];

        let summary = summarize_runs(&runs);
        assert_eq!(summary.total_runs, 4);
        assert_eq!(summary.passed_runs, 2);
        assert_eq!(summary.success_rate, 50.0);
        assert_eq!(summary.failure_rate, 50.0);
        assert_eq!(summary.success_rate + summary.failure_rate, 100.0);
        assert_eq!(summary.average_duration, 60.0);
    }

    #[test]
    fn test_timeline_counts_runs_not_executions() {
        let runs = vec![
            run(ts(2023, 1, 15, 9), &[("a", Passed), ("b", Failed), ("c", Failed)]),
            run(ts(2023, 1, 15, 10), &[("a", Passed)]),
            run(ts(2023, 1, 16, 9), &[("a", Failed)]),
        ];

        let timeline = run_timeline(&runs, Timeframe::Day);
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].date, "2023-01-15");
        assert_eq!(timeline[0].total_runs, 2);
        assert_eq!(timeline[0].passed_runs, 1);
        assert_eq!(timeline[0].failed_runs, 1);
        assert_eq!(timeline[1].date, "2023-01-16");
        assert_eq!(timeline[1].success_rate, 0.0);

        let monthly = run_timeline(&runs, Timeframe::Month);
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].date, "2023-01");
        assert_eq!(monthly[0].total_runs, 3);
    }

    #[test]
    fn test_p95_uses_nearest_rank() {
        let stats = duration_stats((1..=10).map(|i| (i * 10) as f64).rev());

        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 100.0);
        assert_eq!(stats.average, 55.0);
        assert_eq!(stats.p95, 100.0);

        let twenty = duration_stats((1..=20).map(|i| i as f64));
        assert_eq!(twenty.p95, 20.0);

        let hundred = duration_stats((1..=100).map(|i| i as f64));
        assert_eq!(hundred.p95, 96.0);
    }

    #[test]
    fn test_duration_stats_skip_malformed_values() {
        assert_eq!(duration_stats(Vec::new()), DurationStats::default());
        assert_eq!(
            duration_stats(vec![f64::NAN, -1.0]),
            DurationStats::default()
        );

        let stats = duration_stats(vec![2.0, f64::INFINITY, 4.0]);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.average, 3.0);
    }

    #[test]
    fn test_dimension_stats_group_missing_values_as_unknown() {
        let mut firefox = run(ts(2023, 1, 15, 9), &[("a", Failed)]);
        firefox.browser = Some("firefox".to_string());
        let mut headless = run(ts(2023, 1, 15, 10), &[("a", Passed)]);
        headless.browser = None;
        let chromium = run(ts(2023, 1, 15, 11), &[("a", Passed)]);

        let stats = dimension_stats(&[firefox, headless, chromium], |r| r.browser.as_deref());
        let names: Vec<&str> = stats.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, vec!["chromium", "firefox", "unknown"]);
        assert_eq!(stats[1].success_rate, 0.0);
        assert_eq!(stats[2].success_rate, 100.0);
    }

    #[test]
    fn test_status_breakdown_counts_each_execution_once() {
        let records = vec![
            record("a", Passed, ts(2023, 1, 15, 9)),
            record("a", Failed, ts(2023, 1, 15, 10)),
            record("b", Passed, ts(2023, 1, 15, 11)),
        ];

        let breakdown = status_breakdown(&records);
        assert_eq!(breakdown.get(&Passed), Some(&2));
        assert_eq!(breakdown.get(&Failed), Some(&1));
        assert_eq!(breakdown.values().sum::<usize>(), records.len());
    }

    #[test]
    fn test_slowest_tests_rank_by_average() {
        let mut records = vec![
            record("fast", Passed, ts(2023, 1, 15, 9)),
            record("slow", Passed, ts(2023, 1, 15, 9)),
            record("slow", Passed, ts(2023, 1, 16, 9)),
            record("untimed", Passed, ts(2023, 1, 16, 9)),
        ];
        records[0].execution.duration = Some(0.5);
        records[1].execution.duration = Some(4.0);
        records[2].execution.duration = Some(6.0);
        records[3].execution.duration = None;

        let slowest = slowest_tests(&records, 10);
        assert_eq!(slowest.len(), 2);
        assert_eq!(slowest[0].identifier, "slow");
        assert_eq!(slowest[0].average_duration, 5.0);
        assert_eq!(slowest[0].max_duration, 6.0);
        assert_eq!(slowest[0].executions, 2);

        assert_eq!(slowest_tests(&records, 1).len(), 1);
    }

    #[test]
    fn test_slowest_tests_ignore_unusable_durations() {
        let mut records = vec![
            record("checkout", Passed, ts(2023, 1, 15, 9)),
            record("checkout", Passed, ts(2023, 1, 16, 9)),
            record("checkout", Failed, ts(2023, 1, 17, 9)),
            record("checkout", Passed, ts(2023, 1, 18, 9)),
            record("broken_clock", Passed, ts(2023, 1, 18, 9)),
        ];
        records[0].execution.duration = Some(2.0);
        records[1].execution.duration = Some(f64::NAN);
        records[2].execution.duration = Some(-3.0);
        records[3].execution.duration = Some(4.0);
        records[4].execution.duration = Some(f64::INFINITY);

        let slowest = slowest_tests(&records, 10);
        assert_eq!(slowest.len(), 1);
        assert_eq!(slowest[0].identifier, "checkout");
        assert_eq!(slowest[0].executions, 2);
        assert_eq!(slowest[0].average_duration, 3.0);
        assert_eq!(slowest[0].max_duration, 4.0);
    }
}
