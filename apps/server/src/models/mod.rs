//! Domain models for the analytics server.

pub mod api_key;
pub mod query;
pub mod report;
pub mod test_execution;
pub mod test_run;

// Re-export commonly used types
pub use api_key::{ApiKey, AuthenticatedCaller};
pub use query::{
    AdvancedFlakyOptions, AdvancedFlakyTestsQuery, Aggregation, DateRange, FlakyTestsQuery,
    FlakyTimelineQuery, RunFilters, SortBy, Timeframe, TimelineOptions, TrendsOptions,
    TrendsQuery,
};
pub use report::{
    AdvancedFlakyTestReport, DetailedTrendsReport, DimensionStats, DurationStats,
    EnvironmentCorrelation, EnvironmentFactor, FlakinessPatterns, FlakinessTimelineEntry,
    FlakinessTimelineReport, FlakinessTimelineSummary, FlakinessTrend, FlakyTestReport,
    ImpactScore, RecentExecution, RunSummary, RunTimelineEntry, SlowTest, TrendDirection,
    TrendsReport,
};
pub use test_execution::{ExecutionRecord, ExecutionStatus, TestExecution};
pub use test_run::{RunContext, RunStatus, TestRun, sanitize_duration};
