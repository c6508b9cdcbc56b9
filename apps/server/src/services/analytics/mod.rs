//! Test analytics and flaky-test detection.
//!
//! Every report is recomputed from the Record Store on each call. Nothing is
//! cached and nothing is written back.

pub mod aggregation;
pub mod bucketing;
pub mod flakiness;
pub mod impact;
pub mod store;
pub mod timeline;

#[cfg(test)]
mod fixtures;

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    AdvancedFlakyOptions, AdvancedFlakyTestReport, DateRange, DetailedTrendsReport,
    ExecutionRecord, FlakinessTimelineReport, FlakyTestReport, RunFilters, TestRun, Timeframe,
    TimelineOptions, TrendsOptions, TrendsReport,
};

pub use store::{MemoryStore, RecordStore};

/// Number of entries in the slowest-tests table of a detailed trends report.
pub const SLOWEST_TESTS_LIMIT: usize = 10;

/// Entry point for analytics reports, shared across request handlers.
#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn RecordStore>,
    default_timeframe: Timeframe,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            default_timeframe: Timeframe::default(),
        }
    }

    /// Timeframe used when a trends request does not name one.
    pub fn with_default_timeframe(mut self, timeframe: Timeframe) -> Self {
        self.default_timeframe = timeframe;
        self
    }

    pub fn default_timeframe(&self) -> Timeframe {
        self.default_timeframe
    }

    /// Runs and executions for one request, fetched concurrently.
    async fn fetch_scope(
        &self,
        organization_id: Uuid,
        range: &DateRange,
        filters: &RunFilters,
    ) -> AppResult<(Vec<TestRun>, Vec<ExecutionRecord>)> {
        let (runs, records) = tokio::try_join!(
            self.store.find_test_runs(organization_id, range, filters),
            self.store
                .find_test_executions(organization_id, range, None, filters),
        )?;
        debug!(
            "Fetched {} runs and {} executions for organization {}",
            runs.len(),
            records.len(),
            organization_id
        );
        Ok((runs, records))
    }

    fn trends_report(
        runs: &[TestRun],
        records: &[ExecutionRecord],
        options: &TrendsOptions,
    ) -> TrendsReport {
        TrendsReport {
            timeframe: options.timeframe,
            range: options.range,
            summary: aggregation::summarize_runs(runs),
            status_breakdown: aggregation::status_breakdown(records),
            framework_stats: aggregation::dimension_stats(runs, |r| r.framework.as_deref()),
            browser_stats: aggregation::dimension_stats(runs, |r| r.browser.as_deref()),
            timeline: aggregation::run_timeline(runs, options.timeframe),
            duration_stats: aggregation::duration_stats(
                records.iter().filter_map(|r| r.execution.duration),
            ),
        }
    }

    /// Organization-wide trends report. Run filters are not applied.
    pub async fn get_overview(
        &self,
        organization_id: Uuid,
        timeframe: Timeframe,
        range: DateRange,
    ) -> AppResult<TrendsReport> {
        let options = TrendsOptions {
            range,
            timeframe,
            filters: RunFilters::default(),
        };
        let (runs, records) = self
            .fetch_scope(organization_id, &options.range, &options.filters)
            .await?;

        let report = Self::trends_report(&runs, &records, &options);
        info!(
            "Overview for organization {}: {} runs, {} timeline buckets",
            organization_id,
            report.summary.total_runs,
            report.timeline.len()
        );
        Ok(report)
    }

    /// Trends report with framework/browser filters and extra breakdowns.
    pub async fn get_trends(
        &self,
        organization_id: Uuid,
        options: TrendsOptions,
    ) -> AppResult<DetailedTrendsReport> {
        let (runs, records) = self
            .fetch_scope(organization_id, &options.range, &options.filters)
            .await?;

        let report = DetailedTrendsReport {
            overview: Self::trends_report(&runs, &records, &options),
            filters: options.filters.clone(),
            platform_stats: aggregation::dimension_stats(&runs, |r| r.platform.as_deref()),
            branch_stats: aggregation::dimension_stats(&runs, |r| r.branch.as_deref()),
            slowest_tests: aggregation::slowest_tests(&records, SLOWEST_TESTS_LIMIT),
        };
        info!(
            "Trends for organization {}: {} runs, {} executions",
            organization_id,
            report.overview.summary.total_runs,
            records.len()
        );
        Ok(report)
    }

    /// Tests whose status changed at least once, most flaky first.
    pub async fn get_flaky_tests(
        &self,
        organization_id: Uuid,
        range: DateRange,
    ) -> AppResult<Vec<FlakyTestReport>> {
        let records = self
            .store
            .find_test_executions(organization_id, &range, None, &RunFilters::default())
            .await?;
        debug!(
            "Analyzing {} executions for organization {}",
            records.len(),
            organization_id
        );

        let reports = flakiness::analyze_basic(&records);
        info!(
            "Found {} flaky tests for organization {}",
            reports.len(),
            organization_id
        );
        Ok(reports)
    }

    /// Flaky tests with patterns, trend, confidence and impact.
    pub async fn get_advanced_flaky_tests(
        &self,
        organization_id: Uuid,
        options: AdvancedFlakyOptions,
    ) -> AppResult<Vec<AdvancedFlakyTestReport>> {
        let records = self
            .store
            .find_test_executions(organization_id, &options.range, None, &RunFilters::default())
            .await?;
        debug!(
            "Analyzing {} executions for organization {} (minExecutions={}, minFlakinessScore={})",
            records.len(),
            organization_id,
            options.min_executions,
            options.min_flakiness_score
        );

        let run_index = impact::RunIndex::build(&records);
        let mut reports: Vec<AdvancedFlakyTestReport> =
            flakiness::qualifying_histories(&records, &options)
                .iter()
                .map(|history| {
                    let base = history.report();
                    let (patterns, environment_correlations) =
                        flakiness::detect_patterns(history);
                    let impact = run_index.impact_for(&base.identifier, base.flakiness_score);
                    AdvancedFlakyTestReport {
                        patterns,
                        trend: flakiness::analyze_trend(history),
                        confidence_level: flakiness::confidence_level(history.total_runs()),
                        environment_correlations,
                        impact,
                        base,
                    }
                })
                .collect();
        impact::sort_reports(&mut reports, options.sort_by);

        info!(
            "Advanced analysis for organization {}: {} flaky tests across {} runs",
            organization_id,
            reports.len(),
            run_index.total_runs()
        );
        Ok(reports)
    }

    /// Flakiness per period, optionally for a single test.
    pub async fn get_flaky_tests_timeline(
        &self,
        organization_id: Uuid,
        options: TimelineOptions,
    ) -> AppResult<FlakinessTimelineReport> {
        let records = self
            .store
            .find_test_executions(
                organization_id,
                &options.range,
                options.identifier.as_deref(),
                &RunFilters::default(),
            )
            .await?;

        let report =
            timeline::build_flakiness_timeline(&records, options.group_by, options.aggregation);
        info!(
            "Flakiness timeline for organization {}: {} periods from {} executions",
            organization_id,
            report.summary.periods,
            records.len()
        );
        Ok(report)
    }
}
