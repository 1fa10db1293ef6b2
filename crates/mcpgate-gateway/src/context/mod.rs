//! Request-scoped context shared across pipeline stages.
//!
//! Auth stores [`crate::auth::Claims`] and tenant resolution stores a
//! [`tenant::TenantContext`] in request extensions; later stages and handlers
//! read them back without coupling to header parsing.

pub mod tenant;

pub use tenant::TenantContext;
