//! Per-test flakiness analysis.
//!
//! Executions arrive newest first (see [`RecordStore`]). They are grouped by
//! identifier in order of first appearance, and that order is the tie-break
//! for every sort in this module.
//!
//! [`RecordStore`]: super::store::RecordStore

use chrono::{Datelike, Timelike};
use indexmap::IndexMap;

use super::aggregation::percentage;
use crate::models::{
    AdvancedFlakyOptions, EnvironmentCorrelation, EnvironmentFactor, ExecutionRecord,
    ExecutionStatus, FlakinessPatterns, FlakinessTrend, FlakyTestReport, RecentExecution,
    TrendDirection,
};

pub const RECENT_EXECUTIONS_LIMIT: usize = 5;

/// Share of adjacent pairs that must differ for a test to be alternating.
pub const ALTERNATING_THRESHOLD: f64 = 0.7;
/// A weekday or hour bucket is suspicious above this multiple of the overall
/// failure rate...
pub const TIME_BASED_MULTIPLIER: f64 = 1.5;
/// ...and above this absolute failure rate.
pub const TIME_BASED_MIN_RATE: f64 = 0.3;
/// Percentage points between "with value" and "without value" failure rates.
pub const ENVIRONMENT_DIFFERENCE_THRESHOLD: f64 = 20.0;
pub const ENVIRONMENT_MIN_EXECUTIONS: usize = 3;
pub const TREND_MIN_EXECUTIONS: usize = 6;
pub const TREND_CHANGE_THRESHOLD: f64 = 10.0;

/// Executions of one identifier, newest first.
#[derive(Debug)]
pub struct TestHistory<'a> {
    pub identifier: &'a str,
    pub name: &'a str,
    pub suite: Option<&'a str>,
    pub executions: Vec<&'a ExecutionRecord>,
}

impl<'a> TestHistory<'a> {
    fn new(record: &'a ExecutionRecord) -> Self {
        Self {
            identifier: record.identifier(),
            name: &record.execution.name,
            suite: record.execution.suite.as_deref(),
            executions: Vec::new(),
        }
    }

    pub fn total_runs(&self) -> usize {
        self.executions.len()
    }

    pub fn failures(&self) -> usize {
        self.executions
            .iter()
            .filter(|r| r.status().is_failure())
            .count()
    }

    pub fn status_changes(&self) -> usize {
        count_status_changes(self.executions.iter().map(|r| r.status()))
    }

    /// `statusChanges / (totalRuns - 1) * 100`, or 0 below two runs.
    pub fn flakiness_score(&self) -> f64 {
        let total = self.total_runs();
        if total < 2 {
            return 0.0;
        }
        self.status_changes() as f64 / (total - 1) as f64 * 100.0
    }

    pub fn report(&self) -> FlakyTestReport {
        let total_runs = self.total_runs();
        let failures = self.failures();
        FlakyTestReport {
            identifier: self.identifier.to_string(),
            name: self.name.to_string(),
            suite: self.suite.map(str::to_string),
            total_runs,
            failures,
            status_changes: self.status_changes(),
            failure_rate: percentage(failures, total_runs),
            flakiness_score: self.flakiness_score(),
            recent_executions: self
                .executions
                .iter()
                .take(RECENT_EXECUTIONS_LIMIT)
                .map(|r| RecentExecution {
                    status: r.status(),
                    date: r.run_created_at(),
                })
                .collect(),
        }
    }
}

/// Group records by identifier, keeping first-seen order.
pub fn group_by_identifier(records: &[ExecutionRecord]) -> IndexMap<&str, TestHistory<'_>> {
    let mut groups: IndexMap<&str, TestHistory<'_>> = IndexMap::new();
    for record in records {
        groups
            .entry(record.identifier())
            .or_insert_with(|| TestHistory::new(record))
            .executions
            .push(record);
    }
    groups
}

/// Number of adjacent pairs whose statuses differ.
pub fn count_status_changes<I>(statuses: I) -> usize
where
    I: IntoIterator<Item = ExecutionStatus>,
{
    let mut changes = 0;
    let mut previous = None;
    for status in statuses {
        if previous.is_some_and(|p| p != status) {
            changes += 1;
        }
        previous = Some(status);
    }
    changes
}

/// Basic report: every test with a positive flakiness score, most flaky first.
pub fn analyze_basic(records: &[ExecutionRecord]) -> Vec<FlakyTestReport> {
    let mut reports: Vec<FlakyTestReport> = group_by_identifier(records)
        .values()
        .map(TestHistory::report)
        .filter(|r| r.flakiness_score > 0.0)
        .collect();
    reports.sort_by(|a, b| b.flakiness_score.total_cmp(&a.flakiness_score));
    reports
}

/// Histories that pass the advanced report's execution and score thresholds.
pub fn qualifying_histories<'a>(
    records: &'a [ExecutionRecord],
    options: &AdvancedFlakyOptions,
) -> Vec<TestHistory<'a>> {
    group_by_identifier(records)
        .into_values()
        .filter(|h| {
            h.total_runs() >= options.min_executions
                && h.flakiness_score() >= options.min_flakiness_score
        })
        .collect()
}

/// Pattern classification over one test's history.
pub fn detect_patterns(history: &TestHistory<'_>) -> (FlakinessPatterns, Vec<EnvironmentCorrelation>) {
    let mut patterns = FlakinessPatterns::default();
    let mut details = Vec::new();

    let total = history.total_runs();
    if total >= 2 {
        let change_ratio = history.status_changes() as f64 / (total - 1) as f64;
        if change_ratio > ALTERNATING_THRESHOLD {
            patterns.is_alternating = true;
            details.push(format!(
                "Alternates between statuses in {:.0}% of consecutive executions",
                change_ratio * 100.0
            ));
        }
    }

    if let Some(description) = time_based_pattern(history) {
        patterns.is_time_based = true;
        details.push(description);
    }

    let correlations = environment_correlations(history);
    if !correlations.is_empty() {
        patterns.is_environment_specific = true;
        let described: Vec<String> = correlations
            .iter()
            .map(|c| {
                format!(
                    "{} {} fails {:.1}% vs {:.1}% elsewhere",
                    c.factor.as_str(),
                    c.value,
                    c.failure_rate,
                    c.baseline_failure_rate
                )
            })
            .collect();
        details.push(format!("Environment-specific: {}", described.join(", ")));
    }

    if details.is_empty() {
        patterns.is_random = true;
        details.push("No consistent pattern detected; failures appear random".to_string());
    }

    patterns.details = details.join("; ");
    (patterns, correlations)
}

#[derive(Default, Clone, Copy)]
struct FailureCount {
    total: usize,
    failed: usize,
}

impl FailureCount {
    fn add(&mut self, failed: bool) {
        self.total += 1;
        if failed {
            self.failed += 1;
        }
    }

    fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.failed as f64 / self.total as f64
        }
    }
}

fn time_based_pattern(history: &TestHistory<'_>) -> Option<String> {
    let mut overall = FailureCount::default();
    let mut by_weekday = [FailureCount::default(); 7];
    let mut by_hour = [FailureCount::default(); 24];

    for record in &history.executions {
        let failed = record.status().is_failure();
        let at = record.run_created_at();
        overall.add(failed);
        by_weekday[at.weekday().num_days_from_sunday() as usize].add(failed);
        by_hour[at.hour() as usize].add(failed);
    }

    let average = overall.rate();
    let suspicious = |bucket: &FailureCount| {
        let rate = bucket.rate();
        rate > average * TIME_BASED_MULTIPLIER && rate > TIME_BASED_MIN_RATE
    };

    const WEEKDAYS: [&str; 7] = [
        "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
    ];

    let mut hits = Vec::new();
    for (day, bucket) in by_weekday.iter().enumerate() {
        if suspicious(bucket) {
            hits.push(format!("{} ({:.0}%)", WEEKDAYS[day], bucket.rate() * 100.0));
        }
    }
    for (hour, bucket) in by_hour.iter().enumerate() {
        if suspicious(bucket) {
            hits.push(format!("{:02}:00 UTC ({:.0}%)", hour, bucket.rate() * 100.0));
        }
    }

    if hits.is_empty() {
        None
    } else {
        Some(format!(
            "Failures concentrate at {} against {:.0}% overall",
            hits.join(", "),
            average * 100.0
        ))
    }
}

fn factor_value<'r>(record: &'r ExecutionRecord, factor: EnvironmentFactor) -> Option<&'r str> {
    match factor {
        EnvironmentFactor::Browser => record.run.browser.as_deref(),
        EnvironmentFactor::Framework => record.run.framework.as_deref(),
        EnvironmentFactor::Platform => record.run.platform.as_deref(),
        EnvironmentFactor::Branch => record.run.branch.as_deref(),
    }
}

/// Factor values whose failure rate differs from the remaining executions by
/// more than [`ENVIRONMENT_DIFFERENCE_THRESHOLD`] points.
pub fn environment_correlations(history: &TestHistory<'_>) -> Vec<EnvironmentCorrelation> {
    let mut overall = FailureCount::default();
    for record in &history.executions {
        overall.add(record.status().is_failure());
    }

    let mut correlations = Vec::new();
    for factor in EnvironmentFactor::ALL {
        let mut by_value: IndexMap<&str, FailureCount> = IndexMap::new();
        for record in &history.executions {
            if let Some(value) = factor_value(record, factor) {
                by_value
                    .entry(value)
                    .or_default()
                    .add(record.status().is_failure());
            }
        }

        for (value, with) in by_value {
            let without = FailureCount {
                total: overall.total - with.total,
                failed: overall.failed - with.failed,
            };
            if with.total < ENVIRONMENT_MIN_EXECUTIONS || without.total == 0 {
                continue;
            }

            let failure_rate = with.rate() * 100.0;
            let baseline_failure_rate = without.rate() * 100.0;
            let difference = failure_rate - baseline_failure_rate;
            if difference.abs() > ENVIRONMENT_DIFFERENCE_THRESHOLD {
                correlations.push(EnvironmentCorrelation {
                    factor,
                    value: value.to_string(),
                    executions: with.total,
                    failure_rate,
                    baseline_failure_rate,
                    difference,
                });
            }
        }
    }
    correlations
}

fn change_rate(statuses: &[ExecutionStatus]) -> f64 {
    if statuses.len() < 2 {
        return 0.0;
    }
    count_status_changes(statuses.iter().copied()) as f64 / (statuses.len() - 1) as f64
}

/// Compare the status-change rate of the older half of history with the newer.
pub fn analyze_trend(history: &TestHistory<'_>) -> FlakinessTrend {
    let n = history.total_runs();
    if n < TREND_MIN_EXECUTIONS {
        return FlakinessTrend::stable();
    }

    let chronological: Vec<ExecutionStatus> =
        history.executions.iter().rev().map(|r| r.status()).collect();
    let (older, newer) = chronological.split_at(n / 2);
    let first = change_rate(older);
    let second = change_rate(newer);

    let rate = if first == 0.0 {
        if second > 0.0 { 100.0 } else { 0.0 }
    } else {
        (second - first) / first * 100.0
    };

    let direction = if rate > TREND_CHANGE_THRESHOLD {
        TrendDirection::Worsening
    } else if rate < -TREND_CHANGE_THRESHOLD {
        TrendDirection::Improving
    } else {
        TrendDirection::Stable
    };

    FlakinessTrend { direction, rate }
}

/// Confidence in a verdict, from 20 up to 100, by sample size.
pub fn confidence_level(executions: usize) -> u32 {
    let n = executions as u32;
    match n {
        0..5 => 20,
        5..10 => 40 + 6 * (n - 5),
        10..20 => 70 + 2 * (n - 10),
        _ => 90 + (n - 20).min(10),
    }
}
