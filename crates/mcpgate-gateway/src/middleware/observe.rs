//! Request summary logging and HTTP metrics.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::app_state::AppState;
use crate::obs::GaugeVec;

/// Holds one `in_flight` increment; the matching decrement runs on drop, so a
/// request future cancelled mid-flight is still accounted for.
struct InFlight<'a> {
    gauge: &'a GaugeVec,
    method: &'a str,
    route: &'a str,
}

impl<'a> InFlight<'a> {
    fn enter(gauge: &'a GaugeVec, method: &'a str, route: &'a str) -> Self {
        gauge.inc(&[("method", method), ("route", route)]);
        Self {
            gauge,
            method,
            route,
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.gauge.dec(&[("method", self.method), ("route", self.route)]);
    }
}

pub async fn observe_request(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let metrics = state.metrics();
    let in_flight = InFlight::enter(&metrics.http_in_flight, method.as_str(), &route);
    let started_at = Instant::now();

    let response = next.run(request).await;

    let elapsed = started_at.elapsed();
    drop(in_flight);

    let status = response.status();
    metrics.http_requests.inc(&[
        ("method", method.as_str()),
        ("route", route.as_str()),
        ("status", status.as_str()),
    ]);
    metrics
        .http_duration
        .observe(&[("method", method.as_str()), ("route", route.as_str())], elapsed);

    tracing::info!(
        method = %method,
        path = %path,
        status = status.as_u16(),
        duration_ms = elapsed.as_millis() as u64,
        "request summary"
    );

    response
}
