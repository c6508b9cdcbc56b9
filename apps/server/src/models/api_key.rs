//! API Key model for tenant authentication.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// API Key stored in database.
#[derive(Debug, Clone)]
pub struct ApiKey {
    pub id: Uuid,
    /// Organization every request made with this key is scoped to
    pub organization_id: Uuid,
    /// SHA-256 hash of the full key
    pub key_hash: String,
    /// First 8 characters of the key for identification
    pub key_prefix: String,
    /// Human-readable name (e.g., "CI - GitHub Actions")
    pub name: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expires_at| Utc::now() > expires_at)
    }
}

/// Authenticated caller resolved from an API key.
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller {
    pub key_id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub key_prefix: String,
}
