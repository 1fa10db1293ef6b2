//! mcpgate gateway library entry.
//!
//! Wires config, the per-tenant admission controller, the HTTP middleware
//! pipeline and operational endpoints into one axum service. Consumed by the
//! binary (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod admission;
pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod middleware;
pub mod obs;
pub mod ops;
pub mod router;
pub mod telemetry;
