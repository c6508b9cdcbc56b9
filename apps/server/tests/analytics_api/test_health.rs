//! Health and readiness endpoints.

use actix_web::test;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_health_needs_no_credentials() {
    let app = create_test_app(Vec::new()).await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
}

#[actix_rt::test]
async fn test_ready_without_database_reports_in_memory() {
    let app = create_test_app(Vec::new()).await;

    let req = test::TestRequest::get().uri("/api/v1/ready").to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, 200);
    assert_eq!(body["store"], "in-memory");
}
