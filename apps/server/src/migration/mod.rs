//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_test_runs;
mod m20261001_000002_create_test_executions;
mod m20261001_000003_create_api_keys;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_test_runs::Migration),
            Box::new(m20261001_000002_create_test_executions::Migration),
            Box::new(m20261001_000003_create_api_keys::Migration),
        ]
    }
}
