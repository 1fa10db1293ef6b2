//! HTTP rendering of the shared error type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use mcpgate_core::error::{ClientCode, GateError};

/// `GateError` as an axum response: stable code plus human message.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub GateError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.client_code() {
            ClientCode::BadRequest | ClientCode::UnsupportedVersion => StatusCode::BAD_REQUEST,
            ClientCode::AuthFailed => StatusCode::UNAUTHORIZED,
            ClientCode::NotAllowed => StatusCode::FORBIDDEN,
            ClientCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.0.client_code().as_str(),
            "message": self.0.to_string(),
        }));
        (self.status(), body).into_response()
    }
}
