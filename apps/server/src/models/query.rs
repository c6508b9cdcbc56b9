//! Analytics query parameters and the resolved options built from them.
//!
//! Query structs mirror the HTTP surface (camelCase, raw strings). Each one
//! resolves into an options struct with parsed dates and enums, falling back
//! to documented defaults for unrecognised enum values.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};

/// Default `minFlakinessScore` for advanced flaky-test analysis.
pub const DEFAULT_MIN_FLAKINESS_SCORE: f64 = 1.0;
/// Default `minExecutions` for advanced flaky-test analysis.
pub const DEFAULT_MIN_EXECUTIONS: usize = 2;

/// Time bucketing granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[default]
    Day,
    Week,
    Month,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            _ => None,
        }
    }

    /// Parse an optional request value, falling back to `default`.
    pub fn from_param(value: Option<&str>, default: Self) -> Self {
        value.and_then(Self::parse).unwrap_or(default)
    }
}

/// Ordering applied to advanced flaky-test reports (always descending).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    FlakinessScore,
    Impact,
    FailureRate,
}

impl SortBy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "flakinessScore" => Some(Self::FlakinessScore),
            "impact" => Some(Self::Impact),
            "failureRate" => Some(Self::FailureRate),
            _ => None,
        }
    }

    pub fn from_param(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or_default()
    }
}

/// How flakiness timeline periods are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Count,
    Percentage,
}

impl Aggregation {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "count" => Some(Self::Count),
            "percentage" => Some(Self::Percentage),
            _ => None,
        }
    }

    pub fn from_param(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or_default()
    }
}

/// Inclusive range over run creation time. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Parse ISO-8601 `startDate` / `endDate` request values.
    ///
    /// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates. A plain end
    /// date covers the whole day.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> AppResult<Self> {
        let start = parse_date_param("startDate", start, NaiveTime::MIN)?;
        let end = parse_date_param("endDate", end, end_of_day())?;

        if let (Some(s), Some(e)) = (start, end)
            && s > e
        {
            return Err(AppError::InvalidInput(
                "startDate must not be after endDate".to_string(),
            ));
        }

        Ok(Self { start, end })
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.is_none_or(|s| ts >= s) && self.end.is_none_or(|e| ts <= e)
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

fn parse_date_param(
    name: &str,
    value: Option<&str>,
    time_of_day: NaiveTime,
) -> AppResult<Option<DateTime<Utc>>> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| Some(date.and_time(time_of_day).and_utc()))
        .map_err(|_| AppError::InvalidInput(format!("{} must be an ISO-8601 date", name)))
}

/// Run-level filters shared by the runs and executions queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
}

impl RunFilters {
    pub fn new(framework: Option<String>, browser: Option<String>) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            framework: non_empty(framework),
            browser: non_empty(browser),
        }
    }

    pub fn matches(&self, framework: Option<&str>, browser: Option<&str>) -> bool {
        let accepts = |wanted: &Option<String>, actual: Option<&str>| {
            wanted.as_deref().is_none_or(|w| actual == Some(w))
        };
        accepts(&self.framework, framework) && accepts(&self.browser, browser)
    }
}

/// Query parameters for overview and trends reports.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TrendsQuery {
    pub timeframe: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub framework: Option<String>,
    pub browser: Option<String>,
}

/// Resolved trends options.
#[derive(Debug, Clone, Default)]
pub struct TrendsOptions {
    pub range: DateRange,
    pub timeframe: Timeframe,
    pub filters: RunFilters,
}

impl TrendsQuery {
    pub fn resolve(self, default_timeframe: Timeframe) -> AppResult<TrendsOptions> {
        Ok(TrendsOptions {
            range: DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())?,
            timeframe: Timeframe::from_param(self.timeframe.as_deref(), default_timeframe),
            filters: RunFilters::new(self.framework, self.browser),
        })
    }
}

/// Query parameters for the basic flaky-test report.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FlakyTestsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl FlakyTestsQuery {
    pub fn resolve(self) -> AppResult<DateRange> {
        DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

/// Query parameters for the advanced flaky-test report.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AdvancedFlakyTestsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_flakiness_score: Option<f64>,
    pub min_executions: Option<u32>,
    pub sort_by: Option<String>,
    /// Look-back window in days, used when no startDate is given.
    pub time_window: Option<i64>,
}

/// Resolved advanced flaky-test options.
#[derive(Debug, Clone)]
pub struct AdvancedFlakyOptions {
    pub range: DateRange,
    pub min_flakiness_score: f64,
    pub min_executions: usize,
    pub sort_by: SortBy,
}

impl Default for AdvancedFlakyOptions {
    fn default() -> Self {
        Self {
            range: DateRange::default(),
            min_flakiness_score: DEFAULT_MIN_FLAKINESS_SCORE,
            min_executions: DEFAULT_MIN_EXECUTIONS,
            sort_by: SortBy::default(),
        }
    }
}

impl AdvancedFlakyTestsQuery {
    /// Resolve against `now`. A positive `timeWindow` opens the range at
    /// `now - timeWindow days` unless an explicit startDate was given.
    pub fn resolve(self, now: DateTime<Utc>) -> AppResult<AdvancedFlakyOptions> {
        let mut range = DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())?;

        if range.start.is_none()
            && let Some(days) = self.time_window.filter(|d| *d > 0)
        {
            let start = Duration::try_days(days)
                .and_then(|window| now.checked_sub_signed(window))
                .ok_or_else(|| AppError::InvalidInput("timeWindow is out of range".to_string()))?;
            range.start = Some(start);
        }

        let min_flakiness_score = self
            .min_flakiness_score
            .filter(|s| s.is_finite())
            .unwrap_or(DEFAULT_MIN_FLAKINESS_SCORE);

        Ok(AdvancedFlakyOptions {
            range,
            min_flakiness_score,
            min_executions: self
                .min_executions
                .map(|n| n as usize)
                .unwrap_or(DEFAULT_MIN_EXECUTIONS),
            sort_by: SortBy::from_param(self.sort_by.as_deref()),
        })
    }
}

/// Query parameters for the flakiness timeline.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FlakyTimelineQuery {
    pub identifier: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub group_by: Option<String>,
    pub aggregation: Option<String>,
}

/// Resolved flakiness timeline options.
#[derive(Debug, Clone, Default)]
pub struct TimelineOptions {
    pub identifier: Option<String>,
    pub range: DateRange,
    pub group_by: Timeframe,
    pub aggregation: Aggregation,
}

impl FlakyTimelineQuery {
    pub fn resolve(self) -> AppResult<TimelineOptions> {
        Ok(TimelineOptions {
            identifier: self.identifier.filter(|i| !i.trim().is_empty()),
            range: DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())?,
            group_by: Timeframe::from_param(self.group_by.as_deref(), Timeframe::Day),
            aggregation: Aggregation::from_param(self.aggregation.as_deref()),
        })
    }
}
