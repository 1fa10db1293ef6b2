//! Gateway config loader (strict parsing + environment overrides).

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use mcpgate_core::error::{GateError, Result};

pub use schema::{
    AuthSection, GatewayConfig, HeaderMode, LogFormat, RateLimitSection, SecuritySection,
    ServiceSection, TenancySection,
};

/// Env var naming the config file.
pub const CONFIG_PATH_ENV: &str = "MCPGATE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "mcpgate.yaml";

const MINIMAL_CONFIG: &str = "version: 1\n";

/// Load config from `path`, falling back to defaults when the file is absent,
/// then apply process environment overrides and validate.
pub fn load(path: &str) -> Result<GatewayConfig> {
    let raw = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(%path, "config file not found, using defaults");
            MINIMAL_CONFIG.to_string()
        }
        Err(e) => return Err(GateError::Internal(format!("read config failed: {e}"))),
    };
    load_with_env(&raw, |k| std::env::var(k).ok())
}

/// Parse and validate without consulting the environment.
pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    load_with_env(s, |_| None)
}

/// Parse, apply overrides from `lookup`, then validate.
pub fn load_with_env<F>(s: &str, lookup: F) -> Result<GatewayConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| GateError::BadRequest(format!("invalid yaml: {e}")))?;
    apply_env_overrides(&mut cfg, lookup);
    cfg.validate()?;
    Ok(cfg)
}

/// Environment overrides: `PORT`, `ENVIRONMENT`, `JWT_SECRET`, `RATE_LIMIT_RPS`.
pub fn apply_env_overrides<F>(cfg: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup("PORT").filter(|p| !p.is_empty()) {
        let host = cfg
            .service
            .listen
            .rsplit_once(':')
            .map(|(h, _)| h.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        cfg.service.listen = format!("{host}:{port}");
    }

    if let Some(env) = lookup("ENVIRONMENT").filter(|v| !v.is_empty()) {
        cfg.service.environment = env;
    }

    if let Some(secret) = lookup("JWT_SECRET").filter(|v| !v.is_empty()) {
        cfg.auth.jwt_secret = secret;
    }

    if let Some(rps) = lookup("RATE_LIMIT_RPS") {
        match rps.parse::<f64>() {
            Ok(v) => cfg.rate_limit.requests_per_second = v,
            Err(_) => tracing::warn!(value = %rps, "ignoring unparsable RATE_LIMIT_RPS"),
        }
    }
}
