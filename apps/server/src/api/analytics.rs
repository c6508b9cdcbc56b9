//! Analytics API handlers.
//!
//! Every route is scoped to the organization resolved by [`OrgContext`].

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use tracing::debug;

use crate::auth::OrgContext;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::models::{
    AdvancedFlakyTestReport, AdvancedFlakyTestsQuery, DetailedTrendsReport,
    FlakinessTimelineReport, FlakyTestReport, FlakyTestsQuery, FlakyTimelineQuery, TrendsQuery,
    TrendsReport,
};
use crate::services::AnalyticsService;

/// Organization overview: run summary, status breakdown, timeline and durations.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/overview",
    tag = "Analytics",
    params(TrendsQuery),
    responses(
        (status = 200, description = "Trends report for the organization", body = TrendsReport),
        (status = 400, description = "Invalid date parameter", body = ErrorResponse),
        (status = 401, description = "No organization could be resolved", body = ErrorResponse),
    ),
    security(("api_key" = []))
)]
pub async fn get_overview(
    service: web::Data<AnalyticsService>,
    org: OrgContext,
    query: web::Query<TrendsQuery>,
) -> AppResult<HttpResponse> {
    let options = query.into_inner().resolve(service.default_timeframe())?;
    let report = service
        .get_overview(org.organization_id, options.timeframe, options.range)
        .await?;
    Ok(HttpResponse::Ok().json(report))
}

/// Trends filtered by framework and browser, with platform, branch and
/// slowest-test breakdowns.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/trends",
    tag = "Analytics",
    params(TrendsQuery),
    responses(
        (status = 200, description = "Detailed trends report", body = DetailedTrendsReport),
        (status = 400, description = "Invalid date parameter", body = ErrorResponse),
        (status = 401, description = "No organization could be resolved", body = ErrorResponse),
    ),
    security(("api_key" = []))
)]
pub async fn get_trends(
    service: web::Data<AnalyticsService>,
    org: OrgContext,
    query: web::Query<TrendsQuery>,
) -> AppResult<HttpResponse> {
    let options = query.into_inner().resolve(service.default_timeframe())?;
    let report = service.get_trends(org.organization_id, options).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// Tests whose status changed between consecutive executions.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/flaky-tests",
    tag = "Analytics",
    params(FlakyTestsQuery),
    responses(
        (status = 200, description = "Flaky tests, most flaky first", body = Vec<FlakyTestReport>),
        (status = 400, description = "Invalid date parameter", body = ErrorResponse),
        (status = 401, description = "No organization could be resolved", body = ErrorResponse),
    ),
    security(("api_key" = []))
)]
pub async fn get_flaky_tests(
    service: web::Data<AnalyticsService>,
    org: OrgContext,
    query: web::Query<FlakyTestsQuery>,
) -> AppResult<HttpResponse> {
    let range = query.into_inner().resolve()?;
    let reports = service.get_flaky_tests(org.organization_id, range).await?;
    Ok(HttpResponse::Ok().json(reports))
}

/// Flaky tests with pattern, trend, confidence and impact analysis.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/flaky-tests/advanced",
    tag = "Analytics",
    params(AdvancedFlakyTestsQuery),
    responses(
        (status = 200, description = "Advanced flaky-test reports", body = Vec<AdvancedFlakyTestReport>),
        (status = 400, description = "Invalid query parameter", body = ErrorResponse),
        (status = 401, description = "No organization could be resolved", body = ErrorResponse),
    ),
    security(("api_key" = []))
)]
pub async fn get_advanced_flaky_tests(
    service: web::Data<AnalyticsService>,
    org: OrgContext,
    query: web::Query<AdvancedFlakyTestsQuery>,
) -> AppResult<HttpResponse> {
    let options = query.into_inner().resolve(Utc::now())?;
    let reports = service
        .get_advanced_flaky_tests(org.organization_id, options)
        .await?;
    Ok(HttpResponse::Ok().json(reports))
}

/// Flakiness per day, week or month.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/flaky-tests/timeline",
    tag = "Analytics",
    params(FlakyTimelineQuery),
    responses(
        (status = 200, description = "Flakiness timeline and summary", body = FlakinessTimelineReport),
        (status = 400, description = "Invalid date parameter", body = ErrorResponse),
        (status = 401, description = "No organization could be resolved", body = ErrorResponse),
    ),
    security(("api_key" = []))
)]
pub async fn get_flaky_tests_timeline(
    service: web::Data<AnalyticsService>,
    org: OrgContext,
    query: web::Query<FlakyTimelineQuery>,
) -> AppResult<HttpResponse> {
    let options = query.into_inner().resolve()?;
    let report = service
        .get_flaky_tests_timeline(org.organization_id, options)
        .await?;
    Ok(HttpResponse::Ok().json(report))
}

/// Reject malformed query strings (e.g. `minExecutions=abc`) as 400s.
fn query_error_handler(
    err: actix_web::error::QueryPayloadError,
    req: &HttpRequest,
) -> actix_web::Error {
    debug!("Rejected query string for {}: {}", req.path(), err);
    AppError::InvalidInput(err.to_string()).into()
}

/// Configure analytics routes under `/analytics`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/analytics")
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .service(web::resource("/overview").route(web::get().to(get_overview)))
            .service(web::resource("/trends").route(web::get().to(get_trends)))
            .service(web::resource("/flaky-tests").route(web::get().to(get_flaky_tests)))
            .service(
                web::resource("/flaky-tests/advanced")
                    .route(web::get().to(get_advanced_flaky_tests)),
            )
            .service(
                web::resource("/flaky-tests/timeline")
                    .route(web::get().to(get_flaky_tests_timeline)),
            ),
    );
}

