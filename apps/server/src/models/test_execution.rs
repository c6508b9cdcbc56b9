//! Test execution domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;
use uuid::Uuid;

use super::test_run::RunContext;

/// Outcome of one attempt of one test.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Queued,
    Running,
    Passed,
    Failed,
    Skipped,
    Cancelled,
    Blocked,
    Timeout,
    Error,
    Flaky,
    Quarantined,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Cancelled => "cancelled",
            Self::Blocked => "blocked",
            Self::Timeout => "timeout",
            Self::Error => "error",
            Self::Flaky => "flaky",
            Self::Quarantined => "quarantined",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(Self::Queued),
            "running" => Some(Self::Running),
            "passed" => Some(Self::Passed),
            "failed" => Some(Self::Failed),
            "skipped" => Some(Self::Skipped),
            "cancelled" => Some(Self::Cancelled),
            "blocked" => Some(Self::Blocked),
            "timeout" => Some(Self::Timeout),
            "error" => Some(Self::Error),
            "flaky" => Some(Self::Flaky),
            "quarantined" => Some(Self::Quarantined),
            _ => None,
        }
    }

    /// Statuses counted as failures by failure rates and impact.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Timeout | Self::Error)
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One test's outcome within one attempt of a test run.
#[derive(Debug, Clone)]
pub struct TestExecution {
    pub id: Uuid,
    pub test_run_id: Uuid,
    /// Stable grouping key, see [`TestExecution::compute_identifier`].
    pub identifier: String,
    pub name: String,
    pub suite: Option<String>,
    pub attempt: u32,
    pub status: ExecutionStatus,
    /// Duration in seconds.
    pub duration: Option<f64>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TestExecution {
    /// Derive the grouping identifier of a logical test.
    ///
    /// The organization is part of the hashed input so equal suite/name pairs
    /// in different organizations never share an identifier.
    pub fn compute_identifier(organization_id: Uuid, suite: Option<&str>, name: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(organization_id.as_bytes());
        hasher.update(b":");
        hasher.update(suite.unwrap_or_default().as_bytes());
        hasher.update(b":");
        hasher.update(name.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// An execution joined with the run that produced it.
#[derive(Debug, Clone)]
pub struct ExecutionRecord {
    pub execution: TestExecution,
    pub run: RunContext,
}

impl ExecutionRecord {
    pub fn identifier(&self) -> &str {
        &self.execution.identifier
    }

    pub fn status(&self) -> ExecutionStatus {
        self.execution.status
    }

    /// Creation time of the parent run, the ordering key for analytics.
    pub fn run_created_at(&self) -> DateTime<Utc> {
        self.run.created_at
    }
}
