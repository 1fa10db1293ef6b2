//! Shared application state for the mcpgate gateway.
//!
//! Owns the admission registry explicitly (no module-level singleton) so that
//! every test and every server instance gets its own tenant budgets.

use std::sync::Arc;

use axum::http::HeaderName;
use mcpgate_core::error::Result;

use crate::admission::{AdmissionController, AdmissionRegistry, Clock, SystemClock};
use crate::auth::JwtVerifier;
use crate::config::GatewayConfig;
use crate::obs::GatewayMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    tenant_header: HeaderName,
    jwt: Option<JwtVerifier>,
    admission: AdmissionController,
    metrics: GatewayMetrics,
}

impl AppState {
    /// Build application state on the system clock.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        Self::with_clock(cfg, Arc::new(SystemClock::new()))
    }

    /// Build application state on an explicit clock.
    pub fn with_clock(cfg: GatewayConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let tenant_header = cfg.tenancy.header_name()?;
        let jwt = cfg.auth.enabled.then(|| JwtVerifier::new(&cfg.auth));

        let registry = Arc::new(AdmissionRegistry::new());
        let admission = AdmissionController::new(&cfg.rate_limit, registry, clock);

        tracing::info!(
            auth = cfg.auth.enabled,
            rate_limit = admission.enabled(),
            rps = cfg.rate_limit.requests_per_second,
            burst = cfg.rate_limit.burst,
            "gateway state ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                tenant_header,
                jwt,
                admission,
                metrics: GatewayMetrics::default(),
            }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn tenant_header(&self) -> &HeaderName {
        &self.inner.tenant_header
    }

    /// `None` when auth is disabled.
    pub fn jwt(&self) -> Option<&JwtVerifier> {
        self.inner.jwt.as_ref()
    }

    pub fn admission(&self) -> &AdmissionController {
        &self.inner.admission
    }

    pub fn registry(&self) -> Arc<AdmissionRegistry> {
        Arc::clone(self.inner.admission.registry())
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(self.inner.admission.clock())
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.inner.metrics
    }

    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    /// Gauges computed at scrape time.
    pub fn metrics_extra(&self) -> Vec<(&'static str, &'static str, u64)> {
        let registry = self.inner.admission.registry();
        vec![
            (
                "mcpgate_admission_tenants_tracked",
                "Tenants with a live admission budget.",
                registry.len() as u64,
            ),
            (
                "mcpgate_admission_budgets_evicted",
                "Idle tenant budgets evicted since start.",
                registry.evicted_total(),
            ),
        ]
    }
}
