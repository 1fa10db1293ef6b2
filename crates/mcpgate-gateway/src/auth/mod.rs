//! Bearer token verification.
//!
//! Token validation itself is delegated to `jsonwebtoken` (HS256). This
//! module only holds the verifier built from config and the claim shape the
//! pipeline cares about.

use std::collections::HashSet;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use mcpgate_core::error::{GateError, Result};

use crate::config::schema::AuthSection;

/// Claims consumed by tenant resolution and the admin guard.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl Claims {
    /// `user_id` claim, falling back to `sub`.
    pub fn user(&self) -> Option<&str> {
        self.user_id.as_deref().or(self.sub.as_deref())
    }
}

pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
    admin_roles: Vec<String>,
}

impl JwtVerifier {
    pub fn new(cfg: &AuthSection) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is checked when present but not required.
        validation.required_spec_claims = HashSet::new();
        if let Some(iss) = &cfg.issuer {
            validation.set_issuer(&[iss.as_str()]);
        }
        match &cfg.audience {
            Some(aud) => validation.set_audience(&[aud.as_str()]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(cfg.jwt_secret.as_bytes()),
            validation,
            admin_roles: cfg.admin_roles.clone(),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "jwt rejected");
                GateError::AuthFailed("invalid token")
            })
    }

    pub fn is_admin(&self, role: &str) -> bool {
        self.admin_roles.iter().any(|r| r == role)
    }
}
