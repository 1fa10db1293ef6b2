//! HTTP request pipeline stages.
//!
//! Order on `/api/v1`: observe -> cors -> security headers -> bearer auth ->
//! tenant resolution -> admission -> handler.

pub mod admission;
pub mod auth;
pub mod cors;
pub mod observe;
pub mod security;
pub mod tenant;

/// Rate-limit response header names.
pub mod headers {
    pub const LIMIT: &str = "x-ratelimit-limit";
    pub const REMAINING: &str = "x-ratelimit-remaining";
    pub const RESET: &str = "x-ratelimit-reset";
}
