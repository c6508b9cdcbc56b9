//! Organization resolution on analytics routes.

use actix_web::test;
use uuid::Uuid;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_missing_credentials_rejected() {
    let app = create_test_app(seeded_runs()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/analytics/overview")
        .to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, 401);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[actix_rt::test]
async fn test_api_key_without_key_store_rejected() {
    let app = create_test_app(seeded_runs()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/analytics/flaky-tests")
        .insert_header(("X-API-Key", "tak_not-a-real-key"))
        .to_request();
    let (status, _) = send(&app, req).await;

    assert_eq!(status, 401);
}

#[actix_rt::test]
async fn test_wrong_admin_key_falls_back_to_api_key() {
    let app = create_test_app(seeded_runs()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/analytics/overview")
        .insert_header(("X-Admin-Key", "wrong"))
        .insert_header(("X-Organization-Id", org_a().to_string()))
        .to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, 401);
    assert!(body["message"].as_str().unwrap().contains("Missing API key"));
}

#[actix_rt::test]
async fn test_admin_key_requires_organization_header() {
    let app = create_test_app(seeded_runs()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/analytics/overview")
        .insert_header(("X-Admin-Key", TEST_ADMIN_KEY))
        .to_request();
    let (status, _) = send(&app, req).await;

    assert_eq!(status, 401);
}

#[actix_rt::test]
async fn test_admin_key_with_malformed_organization_is_bad_request() {
    let app = create_test_app(seeded_runs()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/analytics/overview")
        .insert_header(("X-Admin-Key", TEST_ADMIN_KEY))
        .insert_header(("X-Organization-Id", "not-a-uuid"))
        .to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[actix_rt::test]
async fn test_unknown_organization_sees_empty_data() {
    let app = create_test_app(seeded_runs()).await;

    let (status, body) =
        get_as_org(&app, "/api/v1/analytics/flaky-tests", Uuid::from_u128(0xc)).await;

    assert_eq!(status, 200);
    assert_eq!(body, serde_json::json!([]));
}
