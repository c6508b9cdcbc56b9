//! SeaORM entity definitions for PostgreSQL database.

pub mod api_key;
pub mod test_execution;
pub mod test_run;
