//! Migration: Create test_runs table and shared trigger function.
//!
//! One row per CI invocation. Analytics scope every query by
//! organization and creation time.

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
                -- Shared trigger function for updated_at
                CREATE OR REPLACE FUNCTION update_updated_at_column()
                RETURNS TRIGGER AS $$
                BEGIN
                    NEW.updated_at = NOW();
                    RETURN NEW;
                END;
                $$ LANGUAGE plpgsql;

                CREATE TABLE test_runs (
                    id UUID PRIMARY KEY,
                    organization_id UUID NOT NULL,
                    status VARCHAR(20) NOT NULL DEFAULT 'queued'
                        CHECK (status IN ('queued', 'running', 'completed', 'cancelled', 'failed', 'timeout', 'error')),
                    duration DOUBLE PRECISION NOT NULL DEFAULT 0
                        CHECK (duration >= 0),

                    commit VARCHAR(64),
                    branch VARCHAR(255),
                    framework VARCHAR(50),
                    browser VARCHAR(50),
                    browser_version VARCHAR(50),
                    platform VARCHAR(50),
                    triggered_by VARCHAR(255),

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Every analytics query filters on these two columns
                CREATE INDEX idx_test_runs_org_created_at
                    ON test_runs(organization_id, created_at DESC);

                CREATE INDEX idx_test_runs_framework ON test_runs(organization_id, framework);
                CREATE INDEX idx_test_runs_browser ON test_runs(organization_id, browser);

                CREATE TRIGGER update_test_runs_updated_at
                    BEFORE UPDATE ON test_runs
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
            .execute_unprepared(
                r#"
                DROP TABLE IF EXISTS test_runs CASCADE;
                DROP FUNCTION IF EXISTS update_updated_at_column() CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
