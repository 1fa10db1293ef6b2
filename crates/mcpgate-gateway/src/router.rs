//! Axum router wiring.
//!
//! Route-level stages are added with `route_layer`, innermost first, so the
//! effective order on `/api/v1` is auth -> tenant -> admission -> handler.

use axum::{middleware::from_fn_with_state, routing::get, Router};

use crate::{api, app_state::AppState, middleware, ops};

pub fn build_router(state: AppState) -> Router {
    let api_v1 = Router::new()
        .route("/whoami", get(api::whoami))
        .route_layer(from_fn_with_state(state.clone(), middleware::admission::enforce_admission))
        .route_layer(from_fn_with_state(state.clone(), middleware::tenant::resolve_request_tenant))
        .route_layer(from_fn_with_state(state.clone(), middleware::auth::require_bearer));

    let admin = Router::new()
        .route("/tenants", get(api::admin_tenants))
        .route_layer(from_fn_with_state(state.clone(), middleware::auth::require_admin))
        .route_layer(from_fn_with_state(state.clone(), middleware::auth::require_bearer));

    let cors = middleware::cors::cors_layer(&state.cfg().security, state.tenant_header());

    Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/info", get(ops::info))
        .route("/metrics", get(ops::metrics))
        .nest("/api/v1", api_v1)
        .nest("/admin", admin)
        .layer(from_fn_with_state(state.clone(), middleware::security::security_headers))
        .layer(cors)
        .layer(from_fn_with_state(state.clone(), middleware::observe::observe_request))
        .with_state(state)
}
