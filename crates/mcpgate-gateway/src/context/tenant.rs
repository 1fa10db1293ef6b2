use axum::http::HeaderMap;

use mcpgate_core::error::{GateError, Result};
use mcpgate_core::TenantKey;

use crate::auth::Claims;

/// Resolved identity for one request.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant: TenantKey,
    pub user_id: Option<String>,
    pub role: Option<String>,
}

/// Resolve tenant identity: header first, then the `tenant_id` claim.
///
/// With `require` unset, an unresolvable tenant maps to the default tenant.
pub fn resolve_tenant(
    headers: &HeaderMap,
    header_name: &str,
    claims: Option<&Claims>,
    require: bool,
) -> Result<TenantContext> {
    let from_header = headers.get(header_name).and_then(|v| v.to_str().ok());
    let from_claim = claims.and_then(|c| c.tenant_id.as_deref());

    let tenant = match TenantKey::first_present([from_header, from_claim]) {
        Some(t) => t,
        None if require => return Err(GateError::BadRequest("tenant id required".into())),
        None => TenantKey::default_tenant(),
    };

    Ok(TenantContext {
        tenant,
        user_id: claims.and_then(|c| c.user().map(str::to_string)),
        role: claims.and_then(|c| c.role.clone()),
    })
}
