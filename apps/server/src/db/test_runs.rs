//! Record Store queries over test runs and test executions.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};
use tracing::warn;
use uuid::Uuid;

use crate::entity::test_execution::{self, Entity as TestExecutionEntity};
use crate::entity::test_run::{self, Entity as TestRunEntity};
use crate::error::{AppError, AppResult};
use crate::models::{
    DateRange, ExecutionRecord, ExecutionStatus, RunFilters, RunStatus, TestExecution, TestRun,
    sanitize_duration,
};
use crate::services::analytics::RecordStore;

use super::DbPool;

/// Upper bound on run ids per `IN (...)` clause.
const RUN_ID_CHUNK_SIZE: usize = 1000;

/// WHERE clause shared by both Record Store queries.
///
/// Scopes by organization, run creation time and run filters, all on
/// `test_runs` columns.
fn run_scope_condition(organization_id: Uuid, range: &DateRange, filters: &RunFilters) -> Condition {
    let mut condition = Condition::all().add(test_run::Column::OrganizationId.eq(organization_id));

    if let Some(start) = range.start {
        condition = condition.add(test_run::Column::CreatedAt.gte(start));
    }
    if let Some(end) = range.end {
        condition = condition.add(test_run::Column::CreatedAt.lte(end));
    }
    if let Some(framework) = &filters.framework {
        condition = condition.add(test_run::Column::Framework.eq(framework.as_str()));
    }
    if let Some(browser) = &filters.browser {
        condition = condition.add(test_run::Column::Browser.eq(browser.as_str()));
    }

    condition
}

fn run_from_model(m: test_run::Model) -> Option<TestRun> {
    let Some(status) = RunStatus::parse(&m.status) else {
        warn!("Skipping test run {} with unknown status '{}'", m.id, m.status);
        return None;
    };

    Some(TestRun {
        id: m.id,
        organization_id: m.organization_id,
        created_at: m.created_at,
        status,
        duration: sanitize_duration(Some(m.duration)).unwrap_or(0.0),
        commit: m.commit,
        branch: m.branch,
        framework: m.framework,
        browser: m.browser,
        browser_version: m.browser_version,
        platform: m.platform,
        triggered_by: m.triggered_by,
        executions: Vec::new(),
    })
}

fn execution_from_model(m: test_execution::Model) -> Option<TestExecution> {
    let Some(status) = ExecutionStatus::parse(&m.status) else {
        warn!(
            "Skipping test execution {} with unknown status '{}'",
            m.id, m.status
        );
        return None;
    };

    Some(TestExecution {
        id: m.id,
        test_run_id: m.test_run_id,
        identifier: m.identifier,
        name: m.name,
        suite: m.suite,
        attempt: u32::try_from(m.attempt.max(1)).unwrap_or(1),
        status,
        duration: sanitize_duration(m.duration),
        started_at: m.started_at,
        completed_at: m.completed_at,
    })
}

impl DbPool {
    async fn executions_for_runs(
        &self,
        run_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<TestExecution>>> {
        let mut by_run: HashMap<Uuid, Vec<TestExecution>> = HashMap::new();

        for chunk in run_ids.chunks(RUN_ID_CHUNK_SIZE) {
            let models = TestExecutionEntity::find()
                .filter(test_execution::Column::TestRunId.is_in(chunk.iter().copied()))
                .order_by_asc(test_execution::Column::Attempt)
                .order_by_asc(test_execution::Column::Id)
                .all(self.connection())
                .await
                .map_err(|e| {
                    AppError::Database(format!("Failed to query test executions: {}", e))
                })?;

            for execution in models.into_iter().filter_map(execution_from_model) {
                by_run.entry(execution.test_run_id).or_default().push(execution);
            }
        }

        Ok(by_run)
    }
}

#[async_trait]
impl RecordStore for DbPool {
    async fn find_test_runs(
        &self,
        organization_id: Uuid,
        range: &DateRange,
        filters: &RunFilters,
    ) -> AppResult<Vec<TestRun>> {
        let models = TestRunEntity::find()
            .filter(run_scope_condition(organization_id, range, filters))
            .order_by_desc(test_run::Column::CreatedAt)
            .order_by_asc(test_run::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to query test runs: {}", e)))?;

        let mut runs: Vec<TestRun> = models.into_iter().filter_map(run_from_model).collect();
        let run_ids: Vec<Uuid> = runs.iter().map(|r| r.id).collect();
        let mut executions = self.executions_for_runs(&run_ids).await?;

        for run in &mut runs {
            run.executions = executions.remove(&run.id).unwrap_or_default();
        }

        Ok(runs)
    }

    async fn find_test_executions(
        &self,
        organization_id: Uuid,
        range: &DateRange,
        identifier: Option<&str>,
        filters: &RunFilters,
    ) -> AppResult<Vec<ExecutionRecord>> {
        let mut condition = run_scope_condition(organization_id, range, filters);
        if let Some(identifier) = identifier {
            condition = condition.add(test_execution::Column::Identifier.eq(identifier));
        }

        let rows = TestExecutionEntity::find()
            .find_also_related(TestRunEntity)
            .filter(condition)
            .order_by_desc(test_run::Column::CreatedAt)
            .order_by_asc(test_run::Column::Id)
            .order_by_desc(test_execution::Column::Attempt)
            .order_by_asc(test_execution::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to query test executions: {}", e)))?;

        let records = rows
            .into_iter()
            .filter_map(|(execution, run)| {
                let run = run_from_model(run?)?;
                Some(ExecutionRecord {
                    execution: execution_from_model(execution)?,
                    run: run.context(),
                })
            })
            .collect();

        Ok(records)
    }
}
