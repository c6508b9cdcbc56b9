//! Basic, advanced and timeline flaky-test reports.

use super::test_helpers::*;

#[actix_rt::test]
async fn test_flaky_tests_lists_only_changing_tests() {
    let app = create_test_app(seeded_runs()).await;

    let (status, body) = get_as_org(&app, "/api/v1/analytics/flaky-tests", org_a()).await;

    assert_eq!(status, 200);
    let reports = body.as_array().unwrap();
    assert_eq!(reports.len(), 1);

    let login = &reports[0];
    assert_eq!(login["identifier"], identifier("login"));
    assert_eq!(login["name"], "login");
    assert_eq!(login["totalRuns"], 4);
    assert_eq!(login["failures"], 2);
    assert_eq!(login["statusChanges"], 3);
    assert_eq!(login["failureRate"], 50.0);
    assert_eq!(login["flakinessScore"], 100.0);

    let recent = login["recentExecutions"].as_array().unwrap();
    assert_eq!(recent.len(), 4);
    assert_eq!(recent[0]["status"], "failed");
}

#[actix_rt::test]
async fn test_flaky_tests_scoped_to_organization() {
    let app = create_test_app(seeded_runs()).await;

    let (status, body) = get_as_org(&app, "/api/v1/analytics/flaky-tests", org_b()).await;

    assert_eq!(status, 200);
    assert_eq!(body, serde_json::json!([]));
}

#[actix_rt::test]
async fn test_advanced_flaky_tests_report() {
    let app = create_test_app(seeded_runs()).await;

    let (status, body) = get_as_org(
        &app,
        "/api/v1/analytics/flaky-tests/advanced?sortBy=impact",
        org_a(),
    )
    .await;

    assert_eq!(status, 200);
    let reports = body.as_array().unwrap();
    assert_eq!(reports.len(), 1);

    let login = &reports[0];
    assert_eq!(login["flakinessScore"], 100.0);
    assert_eq!(login["patterns"]["isAlternating"], true);
    assert_eq!(login["confidenceLevel"], 20);
    assert_eq!(login["impact"]["runsAffected"], 2);
    assert_eq!(login["impact"]["totalRuns"], 4);
    assert_eq!(login["impact"]["impactPercentage"], 50.0);
    assert!(login["trend"]["direction"].is_string());
}

#[actix_rt::test]
async fn test_advanced_thresholds_and_fallbacks() {
    let app = create_test_app(seeded_runs()).await;

    let (status, body) = get_as_org(
        &app,
        "/api/v1/analytics/flaky-tests/advanced?minExecutions=5",
        org_a(),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body, serde_json::json!([]));

    let (status, body) = get_as_org(
        &app,
        "/api/v1/analytics/flaky-tests/advanced?sortBy=duration&timeWindow=0",
        org_a(),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = get_as_org(
        &app,
        "/api/v1/analytics/flaky-tests/advanced?minExecutions=abc",
        org_a(),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");

    let (status, body) = get_as_org(
        &app,
        "/api/v1/analytics/flaky-tests/advanced?minFlakinessScore=100",
        org_a(),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["identifier"], "login");

    let (status, body) = get_as_org(
        &app,
        "/api/v1/analytics/flaky-tests/advanced?minFlakinessScore=100.5",
        org_a(),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body, serde_json::json!([]));

    let (status, body) = get_as_org(
        &app,
        "/api/v1/analytics/flaky-tests/advanced?timeWindow=100000000",
        org_a(),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[actix_rt::test]
async fn test_timeline_counts_changes_within_period() {
    let app = create_test_app(seeded_runs()).await;

    let (status, body) = get_as_org(
        &app,
        "/api/v1/analytics/flaky-tests/timeline?groupBy=month&aggregation=percentage",
        org_a(),
    )
    .await;

    assert_eq!(status, 200);
    let entry = &body["timeline"][0];
    assert_eq!(entry["date"], "2026-01");
    assert_eq!(entry["totalTests"], 2);
    assert_eq!(entry["flakyTests"], 1);
    assert_eq!(entry["statusChanges"], 3);
    assert_eq!(entry["flakinessRate"], 50.0);
    assert_eq!(body["summary"]["periods"], 1);
    assert_eq!(body["summary"]["totalFlakyTests"], 1);
}

#[actix_rt::test]
async fn test_timeline_for_single_identifier_by_day() {
    let app = create_test_app(seeded_runs()).await;

    let uri = format!(
        "/api/v1/analytics/flaky-tests/timeline?identifier={}",
        identifier("login")
    );
    let (status, body) = get_as_org(&app, &uri, org_a()).await;

    assert_eq!(status, 200);
    let timeline = body["timeline"].as_array().unwrap();
    assert_eq!(timeline.len(), 4);
    assert!(timeline.iter().all(|e| e["totalTests"] == 1 && e["flakyTests"] == 0));
    assert!(timeline[0].get("flakinessRate").is_none());
}
