//! Test Analytics Server library.
//!
//! Computes run trends and flaky-test analytics from recorded CI executions.
//! Exposes the database layer, authentication, and the HTTP API.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
