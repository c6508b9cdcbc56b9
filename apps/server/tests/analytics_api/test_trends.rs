//! Overview and trends reports.

use super::test_helpers::*;

#[actix_rt::test]
async fn test_overview_summarizes_runs() {
    let app = create_test_app(seeded_runs()).await;

    let (status, body) = get_as_org(&app, "/api/v1/analytics/overview", org_a()).await;

    assert_eq!(status, 200);
    assert_eq!(body["timeframe"], "day");
    assert_eq!(body["summary"]["totalRuns"], 4);
    assert_eq!(body["summary"]["passedRuns"], 2);
    assert_eq!(body["summary"]["failedRuns"], 2);
    assert_eq!(body["summary"]["successRate"], 50.0);
    assert_eq!(body["statusBreakdown"]["passed"], 6);
    assert_eq!(body["statusBreakdown"]["failed"], 2);
    assert_eq!(body["frameworkStats"][0]["name"], "playwright");

    let timeline = body["timeline"].as_array().unwrap();
    assert_eq!(timeline.len(), 4);
    assert_eq!(timeline[0]["date"], "2026-01-01");
    assert_eq!(timeline[1]["failedRuns"], 1);
}

#[actix_rt::test]
async fn test_overview_empty_organization_is_zeroed() {
    let app = create_test_app(Vec::new()).await;

    let (status, body) = get_as_org(&app, "/api/v1/analytics/overview", org_a()).await;

    assert_eq!(status, 200);
    assert_eq!(body["summary"]["totalRuns"], 0);
    assert_eq!(body["summary"]["successRate"], 0.0);
    assert_eq!(body["durationStats"]["p95"], 0.0);
    assert_eq!(body["timeline"], serde_json::json!([]));
}

#[actix_rt::test]
async fn test_overview_month_bucketing_and_date_range() {
    let app = create_test_app(seeded_runs()).await;

    let (status, body) = get_as_org(
        &app,
        "/api/v1/analytics/overview?timeframe=month&startDate=2026-01-02&endDate=2026-01-03",
        org_a(),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["summary"]["totalRuns"], 2);
    assert_eq!(body["timeline"][0]["date"], "2026-01");
    assert_eq!(body["timeline"][0]["totalRuns"], 2);
}

#[actix_rt::test]
async fn test_overview_rejects_invalid_dates() {
    let app = create_test_app(seeded_runs()).await;

    let (status, _) = get_as_org(
        &app,
        "/api/v1/analytics/overview?startDate=yesterday",
        org_a(),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = get_as_org(
        &app,
        "/api/v1/analytics/overview?startDate=2026-02-01&endDate=2026-01-01",
        org_a(),
    )
    .await;
    assert_eq!(status, 400);
}

#[actix_rt::test]
async fn test_trends_applies_filters_and_lists_slowest_tests() {
    let app = create_test_app(seeded_runs()).await;

    let (status, body) = get_as_org(
        &app,
        "/api/v1/analytics/trends?framework=playwright&timeframe=fortnight",
        org_a(),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["timeframe"], "day");
    assert_eq!(body["filters"]["framework"], "playwright");
    assert_eq!(body["summary"]["totalRuns"], 4);
    assert_eq!(body["platformStats"][0]["name"], "linux");
    assert_eq!(body["branchStats"][0]["name"], "main");
    assert_eq!(body["slowestTests"][0]["name"], "login");
    assert_eq!(body["slowestTests"][0]["averageDuration"], 2.0);

    let (_, filtered) = get_as_org(
        &app,
        "/api/v1/analytics/trends?framework=cypress",
        org_a(),
    )
    .await;
    assert_eq!(filtered["summary"]["totalRuns"], 0);
    assert_eq!(filtered["slowestTests"], serde_json::json!([]));
}
