//! Service API surface.
//!
//! `/api/v1` carries the tenant-scoped routes, `/admin` the operator view of
//! admission state. Services generated from this skeleton mount their own
//! handlers next to `whoami`.

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use mcpgate_core::TenantKey;

use crate::admission::BudgetView;
use crate::app_state::AppState;
use crate::context::TenantContext;

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub tenant: TenantKey,
    pub user_id: Option<String>,
    pub role: Option<String>,
}

pub async fn whoami(Extension(ctx): Extension<TenantContext>) -> Json<WhoAmI> {
    Json(WhoAmI {
        tenant: ctx.tenant,
        user_id: ctx.user_id,
        role: ctx.role,
    })
}

#[derive(Debug, Serialize)]
pub struct TenantBudgets {
    pub enabled: bool,
    pub tracked: usize,
    pub tenants: Vec<BudgetView>,
}

pub async fn admin_tenants(State(state): State<AppState>) -> Json<TenantBudgets> {
    let tenants = state.registry().snapshot(state.clock().now());
    Json(TenantBudgets {
        enabled: state.admission().enabled(),
        tracked: tenants.len(),
        tenants,
    })
}
