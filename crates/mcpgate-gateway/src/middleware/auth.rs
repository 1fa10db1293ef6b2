//! Bearer authentication and the admin role guard.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use mcpgate_core::error::GateError;

use crate::app_state::AppState;
use crate::auth::Claims;
use crate::error::ApiError;

/// Verify `Authorization: Bearer <jwt>` and stash the claims.
///
/// Pass-through when auth is disabled.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(verifier) = state.jwt() else {
        return next.run(request).await;
    };

    let verified = bearer_token(&request)
        .and_then(|token| verifier.verify(token).map_err(|_| "invalid token"));

    let reason = match verified {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            return next.run(request).await;
        }
        Err(reason) => reason,
    };

    tracing::warn!(
        method = %request.method(),
        path = %request.uri().path(),
        reason,
        "authentication failure"
    );
    state.metrics().auth_failures.inc(&[("reason", reason)]);
    ApiError(GateError::AuthFailed(reason)).into_response()
}

fn bearer_token(request: &Request) -> Result<&str, &'static str> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or("authorization header required")?;
    let value = header.to_str().map_err(|_| "bearer token required")?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or("bearer token required")
}

/// Admit only callers whose `role` claim is one of `auth.admin_roles`.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let role = request
        .extensions()
        .get::<Claims>()
        .and_then(|c| c.role.as_deref());

    let allowed = match (role, state.jwt()) {
        (None, _) => Err("role not found"),
        (Some(role), Some(verifier)) if verifier.is_admin(role) => Ok(()),
        (Some(_), _) => Err("admin access required"),
    };

    match allowed {
        Ok(()) => next.run(request).await,
        Err(reason) => ApiError(GateError::NotAllowed(reason)).into_response(),
    }
}
