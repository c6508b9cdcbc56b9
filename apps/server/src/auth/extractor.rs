//! `OrgContext` extractor: resolves the organization a request is scoped to.
//!
//! Resolution order:
//! 1. `X-Admin-Key` matching the configured admin key, plus `X-Organization-Id`.
//! 2. `X-API-Key`, looked up by hash; the key's organization is used.
//! 3. Otherwise the request is rejected with 401. No organization is guessed.

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use uuid::Uuid;

use super::AdminKey;
use crate::config::{ADMIN_KEY_HEADER, API_KEY_HEADER, ORGANIZATION_ID_HEADER};
use crate::db::DbPool;
use crate::error::AppError;
use crate::services::api_key;

/// How the organization was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedBy {
    AdminKey,
    /// Prefix of the API key used.
    ApiKey(String),
}

/// The organization every analytics query in this request is scoped to.
#[derive(Debug, Clone)]
pub struct OrgContext {
    pub organization_id: Uuid,
    pub resolved_by: ResolvedBy,
}

impl OrgContext {
    fn log_resolution(&self) {
        match &self.resolved_by {
            ResolvedBy::AdminKey => {
                debug!("Organization {} resolved by admin key", self.organization_id)
            }
            ResolvedBy::ApiKey(prefix) => debug!(
                "Organization {} resolved by API key {}...",
                self.organization_id, prefix
            ),
        }
    }
}

/// Read a header as a secret. Missing or non-UTF-8 headers yield `None`.
fn secret_header(req: &HttpRequest, name: &str) -> Option<SecretString> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| SecretString::from(v.to_string()))
}

fn organization_header(req: &HttpRequest) -> Result<Uuid, AppError> {
    let raw = req
        .headers()
        .get(ORGANIZATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized(format!(
                "{} header is required with the admin key",
                ORGANIZATION_ID_HEADER
            ))
        })?;

    Uuid::parse_str(raw.trim()).map_err(|_| {
        AppError::InvalidInput(format!("{} must be a UUID", ORGANIZATION_ID_HEADER))
    })
}

impl FromRequest for OrgContext {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let admin_key = req.app_data::<web::Data<AdminKey>>().cloned();
        let pool = req.app_data::<web::Data<DbPool>>().cloned();
        let provided_admin_key = secret_header(req, ADMIN_KEY_HEADER);
        let provided_api_key = secret_header(req, API_KEY_HEADER);

        if let (Some(provided), Some(admin_key)) = (&provided_admin_key, &admin_key)
            && admin_key.verify(provided.expose_secret())
        {
            let result = organization_header(req).map(|organization_id| OrgContext {
                organization_id,
                resolved_by: ResolvedBy::AdminKey,
            });
            if let Ok(ctx) = &result {
                ctx.log_resolution();
            }
            return Box::pin(async move { result });
        }

        Box::pin(async move {
            let Some(key) = provided_api_key else {
                return Err(AppError::Unauthorized(format!(
                    "Missing API key. Provide {} header.",
                    API_KEY_HEADER
                )));
            };

            let Some(pool) = pool else {
                debug!("API key presented but no key store is configured");
                return Err(AppError::Unauthorized("Invalid API key".to_string()));
            };

            let caller = api_key::verify_key(pool.get_ref(), key.expose_secret()).await?;
            let ctx = OrgContext {
                organization_id: caller.organization_id,
                resolved_by: ResolvedBy::ApiKey(caller.key_prefix),
            };
            ctx.log_resolution();
            Ok(ctx)
        })
    }
}
