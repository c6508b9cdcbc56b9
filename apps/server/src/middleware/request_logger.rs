//! Request logging middleware.
//!
//! One line when a request starts and one when it completes, on target `api`.
//! Credentials are never logged in full.

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::StatusCode;
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{ADMIN_KEY_HEADER, API_KEY_HEADER, ORGANIZATION_ID_HEADER};
use crate::services::api_key::{KEY_PREFIX_LENGTH, key_prefix};

/// Request logger middleware factory.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware { service }))
    }
}

pub struct RequestLoggerMiddleware<S> {
    service: S,
}

/// Which credential a request carried, safe to log.
fn credential_summary(req: &ServiceRequest) -> String {
    let header = |name: &str| req.headers().get(name).and_then(|v| v.to_str().ok());

    if header(ADMIN_KEY_HEADER).is_some() {
        return "admin".to_string();
    }
    match header(API_KEY_HEADER) {
        Some(k) if k.len() >= KEY_PREFIX_LENGTH => format!("{}...", key_prefix(k)),
        Some(_) => "malformed".to_string(),
        None => "none".to_string(),
    }
}

fn log_completion(request_id: &Uuid, method: &str, path: &str, status: StatusCode, elapsed_ms: u128) {
    let status_code = status.as_u16();
    if status.is_success() {
        info!(
            target: "api",
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status_code,
            duration_ms = %elapsed_ms,
            "← Request completed"
        );
    } else if status.is_client_error() {
        warn!(
            target: "api",
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status_code,
            duration_ms = %elapsed_ms,
            "← Client error"
        );
    } else {
        warn!(
            target: "api",
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status_code,
            duration_ms = %elapsed_ms,
            "← Server error"
        );
    }
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let request_id = Uuid::now_v7();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let organization = req
            .headers()
            .get(ORGANIZATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();

        info!(
            target: "api",
            request_id = %request_id,
            method = %method,
            path = %path,
            query = %req.query_string(),
            credential = %credential_summary(&req),
            organization = %organization,
            "→ Request started"
        );

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            log_completion(
                &request_id,
                &method,
                &path,
                res.status(),
                start.elapsed().as_millis(),
            );
            Ok(res)
        })
    }
}
