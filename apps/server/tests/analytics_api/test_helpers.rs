//! Shared test helpers for analytics API tests.

use std::sync::Arc;

use actix_web::{App, dev::ServiceResponse, test, web};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

use test_analytics_lib::api;
use test_analytics_lib::auth::AdminKey;
use test_analytics_lib::models::{ExecutionStatus, RunStatus, TestExecution, TestRun};
use test_analytics_lib::services::AnalyticsService;
use test_analytics_lib::services::analytics::MemoryStore;

/// Admin key used in tests.
pub const TEST_ADMIN_KEY: &str = "test-admin-key-for-analytics";

/// Organization holding the seeded history.
pub fn org_a() -> Uuid {
    Uuid::from_u128(0xa)
}

/// Organization with one unrelated failing test.
pub fn org_b() -> Uuid {
    Uuid::from_u128(0xb)
}

pub fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, d, 10, 0, 0).unwrap()
}

fn execution(run_id: Uuid, org: Uuid, name: &str, status: ExecutionStatus, duration: f64) -> TestExecution {
    TestExecution {
        id: Uuid::now_v7(),
        test_run_id: run_id,
        identifier: TestExecution::compute_identifier(org, Some("auth"), name),
        name: name.to_string(),
        suite: Some("auth".to_string()),
        attempt: 1,
        status,
        duration: Some(duration),
        started_at: None,
        completed_at: None,
    }
}

fn run(org: Uuid, created_at: DateTime<Utc>, tests: &[(&str, ExecutionStatus, f64)]) -> TestRun {
    let id = Uuid::now_v7();
    TestRun {
        id,
        organization_id: org,
        created_at,
        status: RunStatus::Completed,
        duration: 60.0,
        commit: None,
        branch: Some("main".to_string()),
        framework: Some("playwright".to_string()),
        browser: Some("chrome".to_string()),
        browser_version: None,
        platform: Some("linux".to_string()),
        triggered_by: None,
        executions: tests
            .iter()
            .map(|(name, status, duration)| execution(id, org, name, *status, *duration))
            .collect(),
    }
}

/// Four daily runs for org A: `login` alternates pass/fail, `logout` always
/// passes. Org B has a single run.
pub fn seeded_runs() -> Vec<TestRun> {
    use ExecutionStatus::{Failed, Passed};

    let names = ["login", "logout"];
    let statuses = [Passed, Failed, Passed, Failed];

    let mut runs: Vec<TestRun> = statuses
        .iter()
        .enumerate()
        .map(|(i, status)| {
            run(
                org_a(),
                day(i as u32 + 1),
                &[(names[0], *status, 2.0), (names[1], Passed, 1.0)],
            )
        })
        .collect();

    runs.push(run(org_b(), day(2), &[("signup", Failed, 5.0)]));
    runs
}

/// Identifier of a seeded org A test.
pub fn identifier(name: &str) -> String {
    TestExecution::compute_identifier(org_a(), Some("auth"), name)
}

/// Create a test app backed by an in-memory store.
pub async fn create_test_app(
    runs: Vec<TestRun>,
) -> impl actix_web::dev::Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
{
    let service = AnalyticsService::new(Arc::new(MemoryStore::new(runs)));
    let admin_key = AdminKey::new(Some(TEST_ADMIN_KEY.to_string()));

    test::init_service(
        App::new()
            .app_data(web::Data::new(service))
            .app_data(web::Data::new(admin_key))
            .service(
                web::scope("/api/v1")
                    .configure(api::configure_health_routes)
                    .configure(api::configure_analytics_routes),
            ),
    )
    .await
}

/// GET `uri` as an admin acting on `org`.
pub async fn get_as_org<S>(app: &S, uri: &str, org: Uuid) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::get()
        .uri(uri)
        .insert_header(("X-Admin-Key", TEST_ADMIN_KEY))
        .insert_header(("X-Organization-Id", org.to_string()))
        .to_request();

    send(app, req).await
}

/// Send a prepared request and read the JSON body.
pub async fn send<S>(app: &S, req: actix_http::Request) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}
