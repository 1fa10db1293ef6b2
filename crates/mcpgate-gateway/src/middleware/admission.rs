//! Admission stage: one token per request from the tenant's budget.
//!
//! Rejections short-circuit with 429 and the rate-limit headers. Admitted
//! responses carry the headers too when `rate_limit.headers` is `always`.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use mcpgate_core::error::GateError;
use mcpgate_core::TenantKey;

use crate::admission::Quota;
use crate::app_state::AppState;
use crate::config::HeaderMode;
use crate::context::TenantContext;
use crate::error::ApiError;

use super::headers;

pub async fn enforce_admission(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.admission().enabled() {
        return next.run(request).await;
    }

    let tenant = request
        .extensions()
        .get::<TenantContext>()
        .map(|ctx| ctx.tenant.clone())
        .unwrap_or_else(TenantKey::default_tenant);

    let decision = state.admission().admit(&tenant);
    state
        .metrics()
        .admission_decisions
        .inc(&[("outcome", decision.outcome.as_str())]);

    if !decision.is_admitted() {
        tracing::debug!(tenant = %tenant, "request rejected by admission control");
        let mut response = ApiError(GateError::RateLimited).into_response();
        if let Some(quota) = decision.quota {
            write_quota(response.headers_mut(), &quota);
        }
        return response;
    }

    let mut response = next.run(request).await;
    if state.cfg().rate_limit.headers == HeaderMode::Always {
        if let Some(quota) = decision.quota {
            write_quota(response.headers_mut(), &quota);
        }
    }
    response
}

pub fn write_quota(headers: &mut HeaderMap, quota: &Quota) {
    headers.insert(headers::LIMIT, HeaderValue::from(quota.limit));
    headers.insert(headers::REMAINING, HeaderValue::from(quota.remaining));
    headers.insert(headers::RESET, HeaderValue::from(quota.reset_at));
}
