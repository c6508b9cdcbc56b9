//! Analytics report DTOs.
//!
//! Every report is derived, never persisted. Percentages are floats in
//! `[0, 100]` and degenerate inputs produce zeroed values, never NaN.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::query::{DateRange, RunFilters, Timeframe};
use super::test_execution::ExecutionStatus;

/// Run-level success summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total_runs: usize,
    pub passed_runs: usize,
    pub failed_runs: usize,
    pub success_rate: f64,
    pub failure_rate: f64,
    /// Mean run duration in seconds.
    pub average_duration: f64,
}

/// Success rate of runs sharing one framework, browser, platform or branch.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DimensionStats {
    pub name: String,
    pub total_runs: usize,
    pub passed_runs: usize,
    pub failed_runs: usize,
    pub success_rate: f64,
}

/// One time bucket of run outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunTimelineEntry {
    pub date: String,
    pub total_runs: usize,
    pub passed_runs: usize,
    pub failed_runs: usize,
    pub success_rate: f64,
}

/// Execution duration statistics in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DurationStats {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub p95: f64,
}

/// Organization-wide trends report.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendsReport {
    pub timeframe: Timeframe,
    pub range: DateRange,
    pub summary: RunSummary,
    /// Execution counts keyed by status.
    #[schema(value_type = Object)]
    pub status_breakdown: BTreeMap<ExecutionStatus, usize>,
    pub framework_stats: Vec<DimensionStats>,
    pub browser_stats: Vec<DimensionStats>,
    pub timeline: Vec<RunTimelineEntry>,
    pub duration_stats: DurationStats,
}

/// A test ranked by execution time.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlowTest {
    pub identifier: String,
    pub name: String,
    pub suite: Option<String>,
    pub executions: usize,
    pub average_duration: f64,
    pub max_duration: f64,
}

/// Trends report with the extra breakdowns of the detailed view.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetailedTrendsReport {
    #[serde(flatten)]
    pub overview: TrendsReport,
    pub filters: RunFilters,
    pub platform_stats: Vec<DimensionStats>,
    pub branch_stats: Vec<DimensionStats>,
    pub slowest_tests: Vec<SlowTest>,
}

/// Status of one recent execution.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentExecution {
    pub status: ExecutionStatus,
    pub date: DateTime<Utc>,
}

/// Basic flakiness metrics of one test identifier.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlakyTestReport {
    pub identifier: String,
    pub name: String,
    pub suite: Option<String>,
    pub total_runs: usize,
    pub failures: usize,
    pub status_changes: usize,
    pub failure_rate: f64,
    pub flakiness_score: f64,
    /// Newest first, at most five.
    pub recent_executions: Vec<RecentExecution>,
}

/// Classification of a test's failure pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlakinessPatterns {
    pub is_alternating: bool,
    pub is_time_based: bool,
    pub is_environment_specific: bool,
    pub is_random: bool,
    pub details: String,
}

/// Direction flakiness is moving in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Stable,
    Worsening,
}

/// Change in status-change rate between the older and newer half of history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlakinessTrend {
    pub direction: TrendDirection,
    /// Relative change in percent.
    pub rate: f64,
}

impl FlakinessTrend {
    pub fn stable() -> Self {
        Self {
            direction: TrendDirection::Stable,
            rate: 0.0,
        }
    }
}

/// Environment attribute checked for failure correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentFactor {
    Browser,
    Framework,
    Platform,
    Branch,
}

impl EnvironmentFactor {
    pub const ALL: [EnvironmentFactor; 4] = [
        EnvironmentFactor::Browser,
        EnvironmentFactor::Framework,
        EnvironmentFactor::Platform,
        EnvironmentFactor::Branch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Framework => "framework",
            Self::Platform => "platform",
            Self::Branch => "branch",
        }
    }
}

/// A factor value whose failure rate stands out from the rest.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentCorrelation {
    pub factor: EnvironmentFactor,
    pub value: String,
    /// Executions carrying this value.
    pub executions: usize,
    pub failure_rate: f64,
    /// Failure rate of executions without this value.
    pub baseline_failure_rate: f64,
    /// `failure_rate - baseline_failure_rate`, in percentage points.
    pub difference: f64,
}

/// Share of CI runs a flaky test breaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImpactScore {
    pub runs_affected: usize,
    pub total_runs: usize,
    pub impact_percentage: f64,
    pub impact_score: f64,
}

/// Flakiness report with pattern, trend, confidence and impact analysis.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedFlakyTestReport {
    #[serde(flatten)]
    pub base: FlakyTestReport,
    pub patterns: FlakinessPatterns,
    pub trend: FlakinessTrend,
    pub confidence_level: u32,
    pub environment_correlations: Vec<EnvironmentCorrelation>,
    pub impact: ImpactScore,
}

/// One period of the flakiness timeline.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlakinessTimelineEntry {
    pub date: String,
    pub total_tests: usize,
    pub flaky_tests: usize,
    pub status_changes: usize,
    /// Present with `aggregation=percentage`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flakiness_rate: Option<f64>,
    /// Present with `aggregation=percentage`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_status_change_rate: Option<f64>,
}

/// Roll-up across all timeline periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlakinessTimelineSummary {
    /// Largest number of distinct tests seen in any one period.
    pub total_tests: usize,
    /// Largest number of flaky tests seen in any one period.
    pub total_flaky_tests: usize,
    /// Mean of per-period flakiness rates.
    pub average_flakiness_score: f64,
    pub periods: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlakinessTimelineReport {
    pub timeline: Vec<FlakinessTimelineEntry>,
    pub summary: FlakinessTimelineSummary,
}
