//! Record builders shared by the analytics unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::models::{
    ExecutionRecord, ExecutionStatus, RunContext, RunStatus, TestExecution, TestRun,
};

pub fn ts(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

pub fn execution(run_id: Uuid, identifier: &str, status: ExecutionStatus) -> TestExecution {
    TestExecution {
        id: Uuid::now_v7(),
        test_run_id: run_id,
        identifier: identifier.to_string(),
        name: format!("{} name", identifier),
        suite: Some("suite".to_string()),
        attempt: 1,
        status,
        duration: Some(1.0),
        started_at: None,
        completed_at: None,
    }
}

/// A completed run holding one execution per `(identifier, status)` pair.
pub fn run(created_at: DateTime<Utc>, results: &[(&str, ExecutionStatus)]) -> TestRun {
    let id = Uuid::now_v7();
    TestRun {
        id,
        organization_id: Uuid::nil(),
        created_at,
        status: RunStatus::Completed,
        duration: 60.0,
        commit: None,
        branch: Some("main".to_string()),
        framework: Some("playwright".to_string()),
        browser: Some("chromium".to_string()),
        browser_version: None,
        platform: Some("linux".to_string()),
        triggered_by: None,
        executions: results
            .iter()
            .map(|(identifier, status)| execution(id, identifier, *status))
            .collect(),
    }
}

/// One execution in its own run.
pub fn record(
    identifier: &str,
    status: ExecutionStatus,
    created_at: DateTime<Utc>,
) -> ExecutionRecord {
    ExecutionRecord {
        execution: execution(Uuid::now_v7(), identifier, status),
        run: RunContext {
            created_at,
            framework: Some("playwright".to_string()),
            browser: Some("chromium".to_string()),
            platform: Some("linux".to_string()),
            branch: Some("main".to_string()),
        },
    }
}

/// Daily history of one test, given oldest first and returned newest first
/// the way the record store orders executions.
pub fn history(
    identifier: &str,
    statuses: &[ExecutionStatus],
    start: DateTime<Utc>,
) -> Vec<ExecutionRecord> {
    let mut records: Vec<ExecutionRecord> = statuses
        .iter()
        .enumerate()
        .map(|(i, status)| record(identifier, *status, start + Duration::days(i as i64)))
        .collect();
    records.reverse();
    records
}

/// Newest-first ordering across several histories.
pub fn newest_first(mut records: Vec<ExecutionRecord>) -> Vec<ExecutionRecord> {
    records.sort_by(|a, b| b.run_created_at().cmp(&a.run_created_at()));
    records
}
