//! End-to-end pipeline: auth -> tenant -> admission -> handler.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use serde_json::Value;
use tower::ServiceExt;

use mcpgate_gateway::{
    admission::{Clock, ManualClock},
    app_state::AppState,
    config,
    middleware::observe::observe_request,
    router::build_router,
};

const SECRET: &str = "test-secret-key";
const UNIX_ORIGIN: u64 = 1_700_000_000;

#[derive(Serialize)]
struct TestClaims<'a> {
    sub: &'a str,
    exp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    tenant_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
}

fn token(tenant_id: Option<&str>, role: Option<&str>) -> String {
    let claims = TestClaims {
        sub: "user-1",
        exp: 4_000_000_000,
        tenant_id,
        role,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

fn app_with(extra: &str) -> (Router, AppState, Arc<ManualClock>) {
    let raw = format!(
        "version: 1\nauth: {{ jwt_secret: \"{SECRET}\" }}\n{extra}\n"
    );
    let cfg = config::load_from_str(&raw).unwrap();
    let clock = Arc::new(ManualClock::new(UNIX_ORIGIN));
    let state = AppState::with_clock(cfg, clock.clone()).unwrap();
    (build_router(state.clone()), state, clock)
}

fn get(uri: &str, bearer: Option<&str>, tenant: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().uri(uri).method("GET");
    if let Some(t) = bearer {
        b = b.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    if let Some(t) = tenant {
        b = b.header("x-tenant-id", t);
    }
    b.body(Body::empty()).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.unwrap()
}

async fn json_body(res: Response<Body>) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn header_str<'a>(res: &'a Response<Body>, name: &str) -> Option<&'a str> {
    res.headers().get(name).and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn health_and_info_are_public() {
    let (app, _, _) = app_with("");

    let res = send(&app, get("/healthz", None, None)).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = send(&app, get("/readyz", None, None)).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = send(&app, get("/info", None, None)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["service"], "mcpgate");
    assert_eq!(body["environment"], "development");
}

#[tokio::test]
async fn readyz_reports_draining() {
    let (app, state, _) = app_with("");
    state.set_draining();
    let res = send(&app, get("/readyz", None, None)).await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn api_requires_bearer_token() {
    let (app, state, _) = app_with("");

    let res = send(&app, get("/api/v1/whoami", None, None)).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(res).await;
    assert_eq!(body["error"], "AUTH_FAILED");
    assert!(body["message"].as_str().unwrap().contains("authorization header required"));

    let req = Request::builder()
        .uri("/api/v1/whoami")
        .header(header::AUTHORIZATION, "Basic abc")
        .body(Body::empty())
        .unwrap();
    let res = send(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(json_body(res).await["message"].as_str().unwrap().contains("bearer token required"));

    let res = send(&app, get("/api/v1/whoami", Some("not.a.jwt"), None)).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(json_body(res).await["message"].as_str().unwrap().contains("invalid token"));

    assert_eq!(state.metrics().auth_failures.get(&[("reason", "invalid token")]), 1);
    // Rejected before tenant resolution: no budget was created.
    assert!(state.registry().is_empty());
}

#[tokio::test]
async fn tenant_header_wins_over_claim() {
    let (app, _, _) = app_with("");
    let t = token(Some("from-claim"), None);

    let res = send(&app, get("/api/v1/whoami", Some(&t), Some("from-header"))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["tenant"], "from-header");
    assert_eq!(body["user_id"], "user-1");

    let res = send(&app, get("/api/v1/whoami", Some(&t), None)).await;
    assert_eq!(json_body(res).await["tenant"], "from-claim");
}

#[tokio::test]
async fn missing_tenant_maps_to_default_or_is_rejected() {
    let (app, _, _) = app_with("");
    let t = token(None, None);
    let res = send(&app, get("/api/v1/whoami", Some(&t), None)).await;
    assert_eq!(json_body(res).await["tenant"], "default");

    let (strict, state, _) = app_with("tenancy: { require: true }");
    let res = send(&strict, get("/api/v1/whoami", Some(&t), None)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await["error"], "BAD_REQUEST");
    assert!(state.registry().is_empty());
}

#[tokio::test]
async fn acme_burst_is_enforced_with_headers() {
    let (app, state, clock) = app_with("rate_limit: { requests_per_second: 1, burst: 5 }");
    let t = token(Some("acme"), None);

    for expected in ["4", "3", "2", "1", "0"] {
        let res = send(&app, get("/api/v1/whoami", Some(&t), None)).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(header_str(&res, "x-ratelimit-limit"), Some("1"));
        assert_eq!(header_str(&res, "x-ratelimit-remaining"), Some(expected));
    }

    let res = send(&app, get("/api/v1/whoami", Some(&t), None)).await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header_str(&res, "x-ratelimit-limit"), Some("1"));
    assert_eq!(header_str(&res, "x-ratelimit-remaining"), Some("0"));
    let reset = (UNIX_ORIGIN + 1).to_string();
    assert_eq!(header_str(&res, "x-ratelimit-reset"), Some(reset.as_str()));
    let body = json_body(res).await;
    assert_eq!(body["error"], "RATE_LIMITED");
    assert_eq!(body["message"], "rate limit exceeded");

    clock.advance(Duration::from_secs(2));
    let res = send(&app, get("/api/v1/whoami", Some(&t), None)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(header_str(&res, "x-ratelimit-remaining"), Some("1"));

    let m = state.metrics();
    assert_eq!(m.admission_decisions.get(&[("outcome", "admitted")]), 6);
    assert_eq!(m.admission_decisions.get(&[("outcome", "rejected")]), 1);
}

#[tokio::test]
async fn one_tenant_exhausted_does_not_block_another() {
    let (app, _, _) = app_with("rate_limit: { requests_per_second: 1, burst: 2 }");
    let a = token(Some("tenant-a"), None);
    let b = token(Some("tenant-b"), None);

    for _ in 0..2 {
        let res = send(&app, get("/api/v1/whoami", Some(&a), None)).await;
        assert_eq!(res.status(), StatusCode::OK);
    }
    assert_eq!(
        send(&app, get("/api/v1/whoami", Some(&a), None)).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(send(&app, get("/api/v1/whoami", Some(&b), None)).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn on_reject_mode_omits_headers_on_success() {
    let (app, _, _) =
        app_with("rate_limit: { requests_per_second: 1, burst: 1, headers: on_reject }");
    let t = token(Some("quiet"), None);

    let res = send(&app, get("/api/v1/whoami", Some(&t), None)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(header_str(&res, "x-ratelimit-remaining").is_none());

    let res = send(&app, get("/api/v1/whoami", Some(&t), None)).await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header_str(&res, "x-ratelimit-remaining"), Some("0"));
}

#[tokio::test]
async fn disabled_rate_limit_passes_through() {
    let (app, state, _) = app_with("rate_limit: { enabled: false, burst: 1 }");
    let t = token(Some("acme"), None);

    for _ in 0..50 {
        let res = send(&app, get("/api/v1/whoami", Some(&t), None)).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(header_str(&res, "x-ratelimit-limit").is_none());
    }
    assert!(state.registry().is_empty());
}

#[tokio::test]
async fn disabled_auth_still_resolves_tenant_from_header() {
    let (app, _, _) = {
        let cfg = config::load_from_str("version: 1\nauth: { enabled: false }\n").unwrap();
        let clock = Arc::new(ManualClock::new(UNIX_ORIGIN));
        let state = AppState::with_clock(cfg, clock.clone()).unwrap();
        (build_router(state.clone()), state, clock)
    };

    let res = send(&app, get("/api/v1/whoami", None, Some("open"))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["tenant"], "open");
    assert!(body["user_id"].is_null());
}

#[tokio::test]
async fn admin_routes_require_admin_role() {
    let (app, _, _) = app_with("rate_limit: { requests_per_second: 1, burst: 3 }");

    let plain = token(Some("acme"), None);
    let res = send(&app, get("/admin/tenants", Some(&plain), None)).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert!(json_body(res).await["message"].as_str().unwrap().contains("role not found"));

    let viewer = token(Some("acme"), Some("viewer"));
    let res = send(&app, get("/admin/tenants", Some(&viewer), None)).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(res).await["error"], "NOT_ALLOWED");

    send(&app, get("/api/v1/whoami", Some(&plain), None)).await;

    let admin = token(None, Some("admin"));
    let res = send(&app, get("/admin/tenants", Some(&admin), None)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["enabled"], true);
    assert_eq!(body["tracked"], 1);
    assert_eq!(body["tenants"][0]["tenant"], "acme");
    assert_eq!(body["tenants"][0]["available_tokens"], 2.0);
    assert_eq!(body["tenants"][0]["capacity"], 3.0);
}

#[tokio::test]
async fn security_headers_are_set() {
    let (app, _, _) = app_with("");
    let res = send(&app, get("/healthz", None, None)).await;
    assert_eq!(header_str(&res, "x-content-type-options"), Some("nosniff"));
    assert_eq!(header_str(&res, "x-frame-options"), Some("DENY"));
    assert_eq!(header_str(&res, "content-security-policy"), Some("default-src 'self'"));

    let (app, _, _) = app_with("security: { security_headers: false }");
    let res = send(&app, get("/healthz", None, None)).await;
    assert!(header_str(&res, "x-frame-options").is_none());
}

#[tokio::test]
async fn cors_allows_configured_origin() {
    let (app, _, _) = app_with("");
    let req = Request::builder()
        .uri("/healthz")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let res = send(&app, req).await;
    assert_eq!(header_str(&res, "access-control-allow-origin"), Some("http://localhost:3000"));
    assert_eq!(header_str(&res, "access-control-allow-credentials"), Some("true"));
}

#[tokio::test]
async fn metrics_expose_requests_and_admission() {
    let (app, _, _) = app_with("rate_limit: { requests_per_second: 1, burst: 1 }");
    let t = token(Some("acme"), None);
    send(&app, get("/api/v1/whoami", Some(&t), None)).await;
    send(&app, get("/api/v1/whoami", Some(&t), None)).await;

    let res = send(&app, get("/metrics", None, None)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains("# TYPE mcpgate_http_requests_total counter"));
    assert!(text.contains(r#"mcpgate_admission_decisions_total{outcome="admitted"} 1"#));
    assert!(text.contains(r#"mcpgate_admission_decisions_total{outcome="rejected"} 1"#));
    assert!(text.contains(r#"route="/api/v1/whoami",status="429""#));
    assert!(text.contains("mcpgate_admission_tenants_tracked 1"));
    assert!(text.contains("mcpgate_draining 0"));
}

#[tokio::test]
async fn in_flight_gauge_drops_when_request_is_cancelled() {
    let (_, state, _) = app_with("");
    let stalled = Router::new()
        .route("/stall", axum::routing::get(std::future::pending::<&'static str>))
        .layer(axum::middleware::from_fn_with_state(state.clone(), observe_request))
        .with_state(state.clone());
    let labels = [("method", "GET"), ("route", "/stall")];

    let fut = stalled.oneshot(get("/stall", None, None));
    let mut fut = Box::pin(fut);
    let timed_out = tokio::time::timeout(Duration::from_millis(50), &mut fut).await;
    assert!(timed_out.is_err());
    assert_eq!(state.metrics().http_in_flight.get(&labels), 1);

    drop(fut);
    assert_eq!(state.metrics().http_in_flight.get(&labels), 0);
    assert_eq!(
        state
            .metrics()
            .http_requests
            .get(&[("method", "GET"), ("route", "/stall"), ("status", "200")]),
        0
    );
}

#[tokio::test]
async fn tokens_without_exp_are_accepted_but_expired_ones_are_not() {
    #[derive(Serialize)]
    struct NoExp<'a> {
        sub: &'a str,
        tenant_id: &'a str,
    }
    let key = EncodingKey::from_secret(SECRET.as_bytes());
    let (app, _, _) = app_with("");

    let claims = NoExp {
        sub: "user-2",
        tenant_id: "acme",
    };
    let no_exp = encode(&Header::default(), &claims, &key).unwrap();
    let res = send(&app, get("/api/v1/whoami", Some(&no_exp), None)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await["tenant"], "acme");

    let expired = TestClaims {
        sub: "user-1",
        exp: 1_000,
        tenant_id: Some("acme"),
        role: None,
    };
    let expired = encode(&Header::default(), &expired, &key).unwrap();
    let res = send(&app, get("/api/v1/whoami", Some(&expired), None)).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn metrics_carry_no_per_tenant_series_after_eviction() {
    let (app, state, clock) = app_with("");
    for i in 0..50 {
        let tenant = format!("t{i}");
        let t = token(None, None);
        let res = send(&app, get("/api/v1/whoami", Some(&t), Some(&tenant))).await;
        assert_eq!(res.status(), StatusCode::OK);
    }
    assert_eq!(state.registry().len(), 50);

    clock.advance(Duration::from_secs(60));
    let registry = state.registry();
    assert_eq!(registry.evict_idle(clock.now(), Duration::from_secs(5)), 50);

    let res = send(&app, get("/metrics", None, None)).await;
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(!text.contains("tenant="));
    assert!(text.contains(r#"mcpgate_admission_decisions_total{outcome="admitted"} 50"#));
    assert!(text.contains("mcpgate_admission_tenants_tracked 0"));
}
