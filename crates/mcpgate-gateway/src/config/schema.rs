use std::net::SocketAddr;

use axum::http::HeaderName;
use mcpgate_core::error::{GateError, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub service: ServiceSection,

    #[serde(default)]
    pub auth: AuthSection,

    #[serde(default)]
    pub tenancy: TenancySection,

    #[serde(default)]
    pub rate_limit: RateLimitSection,

    #[serde(default)]
    pub security: SecuritySection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(GateError::UnsupportedVersion);
        }

        self.service.validate()?;
        self.auth.validate()?;
        self.tenancy.validate()?;
        self.rate_limit.validate()?;

        Ok(())
    }
}

// --------------------
// service
// --------------------
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSection {
    #[serde(default = "default_service_name")]
    pub name: String,

    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            environment: default_environment(),
            listen: default_listen(),
            log_format: LogFormat::default(),
        }
    }
}

impl ServiceSection {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(GateError::BadRequest("service.name must not be empty".into()));
        }
        self.listen_addr()?;
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            GateError::BadRequest(format!(
                "service.listen must be a valid socket address: {}",
                self.listen
            ))
        })
    }
}

fn default_service_name() -> String {
    "mcpgate".into()
}
fn default_environment() -> String {
    "development".into()
}
fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

// --------------------
// auth
// --------------------
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default)]
    pub issuer: Option<String>,

    #[serde(default)]
    pub audience: Option<String>,

    #[serde(default = "default_admin_roles")]
    pub admin_roles: Vec<String>,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            enabled: true,
            jwt_secret: String::new(),
            issuer: None,
            audience: None,
            admin_roles: default_admin_roles(),
        }
    }
}

impl AuthSection {
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.jwt_secret.is_empty() {
            return Err(GateError::BadRequest(
                "auth.jwt_secret must be set when auth is enabled".into(),
            ));
        }
        Ok(())
    }
}

fn default_admin_roles() -> Vec<String> {
    vec!["admin".into(), "super_admin".into()]
}

// --------------------
// tenancy
// --------------------
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TenancySection {
    #[serde(default = "default_tenant_header")]
    pub header: String,

    /// Reject requests with no resolvable tenant instead of using "default".
    #[serde(default)]
    pub require: bool,
}

impl Default for TenancySection {
    fn default() -> Self {
        Self {
            header: default_tenant_header(),
            require: false,
        }
    }
}

impl TenancySection {
    pub fn validate(&self) -> Result<()> {
        self.header_name()?;
        Ok(())
    }

    pub fn header_name(&self) -> Result<HeaderName> {
        HeaderName::try_from(self.header.as_str()).map_err(|_| {
            GateError::BadRequest(format!(
                "tenancy.header is not a valid header name: {}",
                self.header
            ))
        })
    }
}

fn default_tenant_header() -> String {
    "x-tenant-id".into()
}

// --------------------
// rate_limit
// --------------------
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_rps")]
    pub requests_per_second: f64,

    #[serde(default = "default_burst")]
    pub burst: u32,

    #[serde(default)]
    pub headers: HeaderMode,

    /// Evict budgets idle for this long. Unset keeps every tenant for the
    /// life of the process.
    #[serde(default)]
    pub idle_ttl_secs: Option<u64>,

    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

/// When the `X-RateLimit-*` headers are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMode {
    #[default]
    Always,
    OnReject,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: default_rps(),
            burst: default_burst(),
            headers: HeaderMode::default(),
            idle_ttl_secs: None,
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl RateLimitSection {
    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if !(self.requests_per_second.is_finite() && self.requests_per_second > 0.0) {
            return Err(GateError::BadRequest(
                "rate_limit.requests_per_second must be a positive number".into(),
            ));
        }
        if self.burst == 0 {
            return Err(GateError::BadRequest("rate_limit.burst must be at least 1".into()));
        }
        if self.sweep_interval_secs == 0 {
            return Err(GateError::BadRequest(
                "rate_limit.sweep_interval_secs must be at least 1".into(),
            ));
        }
        if let Some(ttl) = self.idle_ttl_secs {
            // An evicted budget must already have refilled to capacity.
            if (ttl as f64) * self.requests_per_second < f64::from(self.burst) {
                return Err(GateError::BadRequest(
                    "rate_limit.idle_ttl_secs must be long enough to refill a full burst".into(),
                ));
            }
        }
        Ok(())
    }
}

fn default_rps() -> f64 {
    100.0
}
fn default_burst() -> u32 {
    200
}
fn default_sweep_interval_secs() -> u64 {
    60
}

// --------------------
// security
// --------------------
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecuritySection {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_true")]
    pub security_headers: bool,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            security_headers: true,
        }
    }
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".into()]
}

fn default_true() -> bool {
    true
}
