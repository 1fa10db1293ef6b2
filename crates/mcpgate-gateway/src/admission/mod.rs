//! Per-tenant admission control.
//!
//! Each tenant owns an independent token bucket, created lazily on its first
//! request and held in an injectable [`AdmissionRegistry`]. The
//! [`AdmissionController`] turns a tenant key into an admit/reject
//! [`Decision`] carrying the values for the `X-RateLimit-*` headers.
//!
//! Time is read through [`Clock`] so that tests can drive refill with
//! simulated seconds.

pub mod bucket;
pub mod clock;
pub mod controller;
pub mod registry;
pub mod sweeper;

pub use bucket::TokenBucket;
pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{AdmissionController, Decision, Outcome, Quota};
pub use registry::{AdmissionRegistry, BudgetView};
