//! Test run domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::test_execution::{ExecutionStatus, TestExecution};

/// Lifecycle status of a CI test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Queued,
    Running,
    Completed,
    Cancelled,
    Failed,
    Timeout,
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Timeout => "timeout",
            Self::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(Self::Queued),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "failed" => Some(Self::Failed),
            "timeout" => Some(Self::Timeout),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One CI invocation with the executions recorded for it.
#[derive(Debug, Clone)]
pub struct TestRun {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub status: RunStatus,
    /// Wall-clock duration in seconds.
    pub duration: f64,
    pub commit: Option<String>,
    pub branch: Option<String>,
    pub framework: Option<String>,
    pub browser: Option<String>,
    pub browser_version: Option<String>,
    pub platform: Option<String>,
    pub triggered_by: Option<String>,
    pub executions: Vec<TestExecution>,
}

impl TestRun {
    /// A run passes when every one of its executions passed.
    ///
    /// A run without executions passes vacuously.
    pub fn passed(&self) -> bool {
        self.executions
            .iter()
            .all(|e| e.status == ExecutionStatus::Passed)
    }

    /// Parent-run fields carried alongside each execution.
    pub fn context(&self) -> RunContext {
        RunContext {
            created_at: self.created_at,
            framework: self.framework.clone(),
            browser: self.browser.clone(),
            platform: self.platform.clone(),
            branch: self.branch.clone(),
        }
    }
}

/// The subset of a run that execution-level analytics need.
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    pub created_at: DateTime<Utc>,
    pub framework: Option<String>,
    pub browser: Option<String>,
    pub platform: Option<String>,
    pub branch: Option<String>,
}

/// Treat negative or non-finite durations as absent.
pub fn sanitize_duration(duration: Option<f64>) -> Option<f64> {
    duration.filter(|d| d.is_finite() && *d >= 0.0)
}
