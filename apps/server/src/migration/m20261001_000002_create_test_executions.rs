//! Migration: Create test_executions table.
//!
//! One row per test per attempt within a run. `identifier` groups the
//! executions of one logical test across runs.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE test_executions (
                    id UUID PRIMARY KEY,
                    test_run_id UUID NOT NULL REFERENCES test_runs(id) ON DELETE CASCADE,
                    identifier VARCHAR(64) NOT NULL,
                    name TEXT NOT NULL,
                    suite TEXT,
                    attempt INTEGER NOT NULL DEFAULT 1
                        CHECK (attempt >= 1),
                    status VARCHAR(20) NOT NULL
                        CHECK (status IN ('queued', 'running', 'passed', 'failed', 'skipped', 'cancelled',
                                          'blocked', 'timeout', 'error', 'flaky', 'quarantined')),
                    duration DOUBLE PRECISION,
                    started_at TIMESTAMPTZ,
                    completed_at TIMESTAMPTZ,
                    error_message TEXT,
                    stack_trace TEXT,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_test_executions_test_run_id ON test_executions(test_run_id);

                -- Flaky-test timeline for a single test
                CREATE INDEX idx_test_executions_identifier ON test_executions(identifier);

                CREATE TRIGGER update_test_executions_updated_at
                    BEFORE UPDATE ON test_executions
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS test_executions CASCADE;")
            .await?;

        Ok(())
    }
}
