//! mcpgate gateway binary.
//!
//! - Strict YAML config (`MCPGATE_CONFIG`, default `mcpgate.yaml`) + env overrides
//! - Per-tenant admission control on `/api/v1`
//! - Graceful shutdown: draining flag first, then stop accepting

use std::time::Duration;

use tracing::Instrument;

use mcpgate_core::error::{GateError, Result};
use mcpgate_gateway::{admission::sweeper, app_state::AppState, config, router, telemetry};

#[tokio::main]
async fn main() {
    let path = std::env::var(config::CONFIG_PATH_ENV)
        .unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.to_string());

    let cfg = match config::load(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("mcpgate-gateway: config load failed ({path}): {e}");
            std::process::exit(2);
        }
    };

    telemetry::init_logging(cfg.service.log_format);
    let span = tracing::info_span!(
        "service",
        name = %cfg.service.name,
        env = %cfg.service.environment
    );

    if let Err(e) = run(cfg).instrument(span).await {
        tracing::error!(error = %e, "mcpgate-gateway failed");
        std::process::exit(1);
    }
}

async fn run(cfg: config::GatewayConfig) -> Result<()> {
    let listen = cfg.service.listen_addr()?;
    let idle_ttl = cfg.rate_limit.idle_ttl_secs;
    let sweep_every = Duration::from_secs(cfg.rate_limit.sweep_interval_secs);
    let rate_limit_enabled = cfg.rate_limit.enabled;

    let state = AppState::new(cfg)?;

    let sweeper = match idle_ttl {
        Some(ttl) if rate_limit_enabled => Some(sweeper::spawn_sweeper(
            state.registry(),
            state.clock(),
            Duration::from_secs(ttl),
            sweep_every,
        )),
        _ => None,
    };

    let app = router::build_router(state.clone());

    tracing::info!(%listen, version = env!("CARGO_PKG_VERSION"), "mcpgate-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| GateError::Internal(format!("bind {listen} failed: {e}")))?;

    let drain_state = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("shutdown signal received, draining");
            drain_state.set_draining();
        })
        .await
        .map_err(|e| GateError::Internal(format!("server failed: {e}")))?;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    tracing::info!("mcpgate-gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
