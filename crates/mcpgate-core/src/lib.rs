//! mcpgate core: transport-agnostic primitives shared by the gateway and services.
//!
//! This crate defines the error surface and the tenant identity type. It
//! carries no transport or runtime dependencies so it can be reused by any
//! service built from the gateway skeleton.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `GateError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod tenant;

/// Shared result type.
pub use error::{GateError, Result};
pub use tenant::TenantKey;
