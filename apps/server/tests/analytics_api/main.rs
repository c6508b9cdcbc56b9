//! Analytics API test suite.
//!
//! Drives the HTTP surface against an in-memory record store, so no database
//! is required.
//!
//! Run with: cargo test --test analytics_api

mod test_helpers;

mod test_auth;
mod test_flaky_tests;
mod test_health;
mod test_trends;
