//! API key generation, hashing, and verification.
//!
//! A key resolves to exactly one organization. Only the SHA-256 hash of a key
//! is stored; the full key is shown once at creation.

use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{ApiKey, AuthenticatedCaller};

/// API key prefix.
pub const KEY_PREFIX: &str = "tak_";
/// Length of random part of the key.
const KEY_RANDOM_LENGTH: usize = 32;
/// Length of the key prefix stored for identification.
pub const KEY_PREFIX_LENGTH: usize = 8;

/// Generate a new random API key for `organization_id`.
///
/// Returns the full key (to be shown to user once) and the key data for storage.
pub fn generate_key(
    organization_id: Uuid,
    name: &str,
    expires_in: Option<&str>,
) -> AppResult<(String, ApiKey)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("API key name must not be empty".to_string()));
    }

    let expires_at = match expires_in {
        Some(raw) => Some(
            Utc::now()
                + parse_duration(raw).ok_or_else(|| {
                    AppError::InvalidInput(format!("Invalid expiration '{}'", raw))
                })?,
        ),
        None => None,
    };

    let random_part: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(KEY_RANDOM_LENGTH)
        .map(char::from)
        .collect();
    let full_key = format!("{}{}", KEY_PREFIX, random_part);

    let api_key = ApiKey {
        id: Uuid::now_v7(),
        organization_id,
        key_hash: hash_key(&full_key),
        key_prefix: key_prefix(&full_key),
        name: name.to_string(),
        expires_at,
        last_used_at: None,
        created_at: Utc::now(),
        revoked_at: None,
    };

    Ok((full_key, api_key))
}

/// Hash an API key using SHA-256.
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// The first characters of a key, safe to log.
pub fn key_prefix(key: &str) -> String {
    key.chars().take(KEY_PREFIX_LENGTH).collect()
}

/// Parse a duration string like "365d", "30d", "1y", "6m", "2w".
/// A bare number is read as days.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim().to_lowercase();

    let (amount, days_per_unit) = if let Some(days) = s.strip_suffix('d') {
        (days, 1)
    } else if let Some(weeks) = s.strip_suffix('w') {
        (weeks, 7)
    } else if let Some(months) = s.strip_suffix('m') {
        (months, 30)
    } else if let Some(years) = s.strip_suffix('y') {
        (years, 365)
    } else {
        (s.as_str(), 1)
    };

    amount
        .parse::<i64>()
        .ok()
        .filter(|n| *n > 0)
        .and_then(|n| n.checked_mul(days_per_unit))
        .and_then(Duration::try_days)
}

/// Check a stored key's status. Unknown, revoked and expired keys all fail.
pub fn check_key(api_key: Option<ApiKey>) -> AppResult<ApiKey> {
    let api_key = api_key.ok_or_else(|| AppError::Unauthorized("Invalid API key".to_string()))?;

    if api_key.is_revoked() {
        return Err(AppError::Unauthorized("API key has been revoked".to_string()));
    }
    if api_key.is_expired() {
        return Err(AppError::Unauthorized("API key has expired".to_string()));
    }

    Ok(api_key)
}

/// Verify an API key and return the authenticated caller.
pub async fn verify_key(pool: &DbPool, key: &str) -> AppResult<AuthenticatedCaller> {
    let api_key = check_key(pool.find_api_key_by_hash(&hash_key(key)).await?)?;

    // Usage tracking must not fail the request.
    if let Err(e) = pool.touch_api_key(api_key.id).await {
        warn!("Failed to record API key usage for {}: {}", api_key.key_prefix, e);
    }

    Ok(AuthenticatedCaller {
        key_id: api_key.id,
        organization_id: api_key.organization_id,
        name: api_key.name,
        key_prefix: api_key.key_prefix,
    })
}

/// Create a new API key and store it in the database.
pub async fn create_key(
    pool: &DbPool,
    organization_id: Uuid,
    name: &str,
    expires_in: Option<&str>,
) -> AppResult<(String, ApiKey)> {
    let (full_key, api_key) = generate_key(organization_id, name, expires_in)?;
    pool.insert_api_key(&api_key).await?;
    Ok((full_key, api_key))
}
