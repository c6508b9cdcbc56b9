//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::config::API_KEY_HEADER;
use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Test Analytics Server",
        version = "0.1.0",
        description = "Test trends and flaky-test analytics computed from CI execution history"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Analytics endpoints
        api::analytics::get_overview,
        api::analytics::get_trends,
        api::analytics::get_flaky_tests,
        api::analytics::get_advanced_flaky_tests,
        api::analytics::get_flaky_tests_timeline,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Records
            models::RunStatus,
            models::ExecutionStatus,
            models::Timeframe,
            models::SortBy,
            models::Aggregation,
            models::DateRange,
            models::RunFilters,
            // Trends
            models::RunSummary,
            models::DimensionStats,
            models::RunTimelineEntry,
            models::DurationStats,
            models::SlowTest,
            models::TrendsReport,
            models::DetailedTrendsReport,
            // Flakiness
            models::RecentExecution,
            models::FlakyTestReport,
            models::FlakinessPatterns,
            models::TrendDirection,
            models::FlakinessTrend,
            models::EnvironmentFactor,
            models::EnvironmentCorrelation,
            models::ImpactScore,
            models::AdvancedFlakyTestReport,
            models::FlakinessTimelineEntry,
            models::FlakinessTimelineSummary,
            models::FlakinessTimelineReport,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Analytics", description = "Trends and flaky-test analytics, scoped to one organization")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add API key security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new(API_KEY_HEADER),
                    ),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_analytics_routes() {
        let doc = ApiDoc::openapi();

        for path in [
            "/api/v1/analytics/overview",
            "/api/v1/analytics/trends",
            "/api/v1/analytics/flaky-tests",
            "/api/v1/analytics/flaky-tests/advanced",
            "/api/v1/analytics/flaky-tests/timeline",
            "/api/v1/ready",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
