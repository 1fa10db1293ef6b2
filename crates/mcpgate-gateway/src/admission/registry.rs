//! Tenant -> budget registry.
//!
//! `DashMap` shards the key space; each budget additionally sits behind its
//! own `Mutex` so that a refill-then-take sequence is atomic per tenant while
//! different tenants never contend on the same lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;

use mcpgate_core::TenantKey;

use super::bucket::TokenBucket;

/// Read-only snapshot of one tenant's budget.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetView {
    pub tenant: TenantKey,
    pub available_tokens: f64,
    pub capacity: f64,
}

#[derive(Debug, Default)]
pub struct AdmissionRegistry {
    buckets: DashMap<TenantKey, Mutex<TokenBucket>>,
    created: AtomicU64,
    evicted: AtomicU64,
}

impl AdmissionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the tenant's bucket, creating it with `make` if absent.
    ///
    /// Creation happens under the shard's write lock, so concurrent first
    /// calls for one tenant build exactly one bucket.
    pub fn with_bucket<M, F, R>(&self, tenant: &TenantKey, make: M, f: F) -> R
    where
        M: FnOnce() -> TokenBucket,
        F: FnOnce(&mut TokenBucket) -> R,
    {
        if let Some(entry) = self.buckets.get(tenant) {
            return f(&mut lock(entry.value()));
        }

        let entry = self
            .buckets
            .entry(tenant.clone())
            .or_insert_with(|| {
                self.created.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(tenant = %tenant, "admission budget created");
                Mutex::new(make())
            })
            .downgrade();

        let out = f(&mut lock(entry.value()));
        out
    }

    /// Drop budgets that have not been checked for at least `ttl`.
    pub fn evict_idle(&self, now: Duration, ttl: Duration) -> usize {
        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| {
            let bucket = bucket.get_mut().unwrap_or_else(PoisonError::into_inner);
            bucket.idle_for(now) < ttl
        });
        let removed = before.saturating_sub(self.buckets.len());
        if removed > 0 {
            self.evicted.fetch_add(removed as u64, Ordering::Relaxed);
            tracing::debug!(
                removed,
                remaining = self.buckets.len(),
                "idle admission budgets evicted"
            );
        }
        removed
    }

    /// Non-mutating view of every tracked tenant, sorted by tenant key.
    pub fn snapshot(&self, now: Duration) -> Vec<BudgetView> {
        let mut out: Vec<BudgetView> = self
            .buckets
            .iter()
            .map(|r| {
                let bucket = lock(r.value());
                BudgetView {
                    tenant: r.key().clone(),
                    available_tokens: bucket.peek(now),
                    capacity: bucket.capacity(),
                }
            })
            .collect();
        out.sort_by(|a, b| a.tenant.cmp(&b.tenant));
        out
    }

    /// Tokens as of the tenant's last refill, if it has a budget.
    pub fn tokens(&self, tenant: &TenantKey) -> Option<f64> {
        let entry = self.buckets.get(tenant)?;
        let bucket = lock(entry.value());
        Some(bucket.tokens())
    }

    pub fn contains(&self, tenant: &TenantKey) -> bool {
        self.buckets.contains_key(tenant)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total budgets ever created (re-creation after eviction counts again).
    pub fn created_total(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    pub fn evicted_total(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }
}

// A panic while holding a bucket leaves only token arithmetic behind; keep going.
fn lock(m: &Mutex<TokenBucket>) -> MutexGuard<'_, TokenBucket> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
