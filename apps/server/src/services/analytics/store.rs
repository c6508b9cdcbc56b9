//! Record Store seam for the analytics core.
//!
//! The analytics core only reads. `DbPool` implements [`RecordStore`] over
//! Postgres; [`MemoryStore`] keeps everything in a `Vec` and is used by tests
//! and local tooling.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{DateRange, ExecutionRecord, RunFilters, TestRun};

/// Read-only access to test runs and executions.
///
/// Both queries scope by organization, run creation time and run filters in
/// exactly the same way, so their results describe the same set of runs.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Runs newest first, each with its executions ordered by attempt then id.
    async fn find_test_runs(
        &self,
        organization_id: Uuid,
        range: &DateRange,
        filters: &RunFilters,
    ) -> AppResult<Vec<TestRun>>;

    /// Executions joined with their run context, ordered by run `created_at`
    /// descending, then run id, then attempt descending, then execution id.
    async fn find_test_executions(
        &self,
        organization_id: Uuid,
        range: &DateRange,
        identifier: Option<&str>,
        filters: &RunFilters,
    ) -> AppResult<Vec<ExecutionRecord>>;
}

/// In-memory [`RecordStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    runs: Arc<RwLock<Vec<TestRun>>>,
}

impl MemoryStore {
    pub fn new(runs: Vec<TestRun>) -> Self {
        Self {
            runs: Arc::new(RwLock::new(runs)),
        }
    }

    pub fn insert_run(&self, run: TestRun) -> AppResult<()> {
        self.runs
            .write()
            .map_err(|_| AppError::Database("Memory store lock poisoned".to_string()))?
            .push(run);
        Ok(())
    }

    fn scoped_runs(
        &self,
        organization_id: Uuid,
        range: &DateRange,
        filters: &RunFilters,
    ) -> AppResult<Vec<TestRun>> {
        let runs = self
            .runs
            .read()
            .map_err(|_| AppError::Database("Memory store lock poisoned".to_string()))?;

        let mut scoped: Vec<TestRun> = runs
            .iter()
            .filter(|run| {
                run.organization_id == organization_id
                    && range.contains(run.created_at)
                    && filters.matches(run.framework.as_deref(), run.browser.as_deref())
            })
            .cloned()
            .collect();
        scoped.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(scoped)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_test_runs(
        &self,
        organization_id: Uuid,
        range: &DateRange,
        filters: &RunFilters,
    ) -> AppResult<Vec<TestRun>> {
        let mut runs = self.scoped_runs(organization_id, range, filters)?;
        for run in &mut runs {
            run.executions
                .sort_by(|a, b| a.attempt.cmp(&b.attempt).then(a.id.cmp(&b.id)));
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
        let runs = self.scoped_runs(organization_id, range, filters)?;

        let mut records = Vec::new();
        for run in runs {
            let context = run.context();
            let mut executions: Vec<_> = run
                .executions
                .into_iter()
                .filter(|e| identifier.is_none_or(|id| e.identifier == id))
                .collect();
            executions.sort_by(|a, b| b.attempt.cmp(&a.attempt).then(a.id.cmp(&b.id)));

            records.extend(executions.into_iter().map(|execution| ExecutionRecord {
                execution,
                run: context.clone(),
            }));
        }
        Ok(records)
    }
}
