//! Migration: Create api_keys table.
//!
//! Keys resolve the organization a request is scoped to.

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
                CREATE TABLE api_keys (
                    id UUID PRIMARY KEY,
                    organization_id UUID NOT NULL,
                    key_hash VARCHAR(64) NOT NULL,
                    key_prefix VARCHAR(12) NOT NULL,
                    name VARCHAR(100) NOT NULL,

                    expires_at TIMESTAMPTZ,
                    last_used_at TIMESTAMPTZ,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    revoked_at TIMESTAMPTZ
                );

                CREATE UNIQUE INDEX idx_api_keys_key_hash ON api_keys(key_hash);

                CREATE INDEX idx_api_keys_organization_id ON api_keys(organization_id)
                    WHERE revoked_at IS NULL;
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS api_keys CASCADE;")
            .await?;

        Ok(())
    }
}
