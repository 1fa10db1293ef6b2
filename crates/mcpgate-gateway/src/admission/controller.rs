//! Admission decisions.

use std::sync::Arc;

use mcpgate_core::TenantKey;

use crate::config::schema::RateLimitSection;

use super::bucket::TokenBucket;
use super::clock::Clock;
use super::registry::AdmissionRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Admitted,
    Rejected,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Admitted => "admitted",
            Outcome::Rejected => "rejected",
        }
    }
}

/// Values for the `X-RateLimit-*` headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    /// Configured requests per second, rounded.
    pub limit: u64,
    /// Whole tokens left after this decision (0 on rejection).
    pub remaining: u64,
    /// Unix seconds of the next estimated refill boundary.
    pub reset_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub outcome: Outcome,
    /// `None` when admission control is disabled.
    pub quota: Option<Quota>,
}

impl Decision {
    fn pass_through() -> Self {
        Self {
            outcome: Outcome::Admitted,
            quota: None,
        }
    }

    pub fn is_admitted(&self) -> bool {
        self.outcome == Outcome::Admitted
    }
}

#[derive(Debug, Clone, Copy)]
struct ActivePolicy {
    refill_per_sec: f64,
    burst: u32,
    header_limit: u64,
}

/// Per-tenant admission controller.
///
/// Construct once at startup and share via `Arc`. When rate limiting is
/// disabled `admit` never touches the registry.
pub struct AdmissionController {
    policy: Option<ActivePolicy>,
    registry: Arc<AdmissionRegistry>,
    clock: Arc<dyn Clock>,
}

impl AdmissionController {
    pub fn new(
        cfg: &RateLimitSection,
        registry: Arc<AdmissionRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let policy = cfg.enabled.then(|| ActivePolicy {
            refill_per_sec: cfg.requests_per_second,
            burst: cfg.burst.max(1),
            header_limit: cfg.requests_per_second.round().max(0.0) as u64,
        });

        Self {
            policy,
            registry,
            clock,
        }
    }

    pub fn enabled(&self) -> bool {
        self.policy.is_some()
    }

    pub fn registry(&self) -> &Arc<AdmissionRegistry> {
        &self.registry
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Decide whether `tenant` may proceed, consuming one token if so.
    pub fn admit(&self, tenant: &TenantKey) -> Decision {
        let Some(policy) = self.policy else {
            return Decision::pass_through();
        };

        let now = self.clock.now();
        let taken = self.registry.with_bucket(
            tenant,
            || TokenBucket::new(policy.burst, policy.refill_per_sec, now),
            |bucket| bucket.try_take(now),
        );

        let (outcome, remaining) = match taken {
            Some(remaining) => (Outcome::Admitted, remaining),
            None => (Outcome::Rejected, 0),
        };

        Decision {
            outcome,
            quota: Some(Quota {
                limit: policy.header_limit,
                remaining,
                reset_at: self.clock.unix_secs() + 1,
            }),
        }
    }
}
