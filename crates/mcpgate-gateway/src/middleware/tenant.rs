//! Tenant resolution stage.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;
use crate::auth::Claims;
use crate::context::tenant::resolve_tenant;
use crate::error::ApiError;

pub async fn resolve_request_tenant(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let resolved = resolve_tenant(
        request.headers(),
        state.tenant_header().as_str(),
        request.extensions().get::<Claims>(),
        state.cfg().tenancy.require,
    );

    match resolved {
        Ok(ctx) => {
            request.extensions_mut().insert(ctx);
            next.run(request).await
        }
        Err(e) => ApiError(e).into_response(),
    }
}
