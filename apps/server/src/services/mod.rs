//! Business logic services.

pub mod analytics;
pub mod api_key;

pub use analytics::AnalyticsService;
