//! CORS layer built from `security.allowed_origins`.
//!
//! `"*"` (or an empty list) allows any origin without credentials; an explicit
//! list allows credentials.

use axum::http::{header::HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::SecuritySection;

pub fn cors_layer(security: &SecuritySection, tenant_header: &HeaderName) -> CorsLayer {
    let wildcard = security.allowed_origins.is_empty()
        || security.allowed_origins.iter().any(|o| o == "*");

    let origins: Vec<HeaderValue> = security
        .allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o.trim()).ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("cache-control"),
            HeaderName::from_static("x-requested-with"),
            tenant_header.clone(),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ]);

    if wildcard || origins.is_empty() {
        layer.allow_origin(AllowOrigin::any())
    } else {
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}
