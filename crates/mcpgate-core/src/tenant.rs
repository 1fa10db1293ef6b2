//! Tenant identity.
//!
//! A `TenantKey` is the partition key for admission control. Any non-empty
//! string is accepted; callers that cannot resolve an identity substitute
//! [`TenantKey::default_tenant`].

use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;

use crate::error::{GateError, Result};

/// Sentinel tenant used when a request carries no tenant identity.
pub const DEFAULT_TENANT: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TenantKey(String);

impl TenantKey {
    /// Build a key from a non-empty identifier.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(GateError::BadRequest("tenant id must not be empty".into()));
        }
        Ok(Self(id))
    }

    pub fn default_tenant() -> Self {
        Self(DEFAULT_TENANT.to_string())
    }

    /// Pick the first non-empty candidate, in order.
    ///
    /// Returns `None` when every candidate is absent or empty; the caller
    /// decides between rejecting and falling back to the default tenant.
    pub fn first_present<'a, I>(candidates: I) -> Option<Self>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        candidates
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(|s| Self(s.to_string()))
    }

    /// Same as [`TenantKey::first_present`] but never empty-handed.
    pub fn resolve_or_default<'a, I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        Self::first_present(candidates).unwrap_or_else(Self::default_tenant)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_TENANT
    }
}

impl fmt::Display for TenantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for TenantKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TenantKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
