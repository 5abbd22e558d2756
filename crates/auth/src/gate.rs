//! Authorization gate: turns a presented credential into a caller identity.
//!
//! The credential is always passed in explicitly (usually the raw value of the
//! `Authorization` header). The gate knows nothing about projects or tasks.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use taskflow_core::{DomainError, DomainResult, UserId};

use crate::token::TokenService;

#[derive(Debug, Clone)]
pub struct AuthGate {
    tokens: Arc<TokenService>,
}

impl AuthGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Resolve the caller behind an `Authorization` header value.
    pub fn authenticate(&self, authorization: Option<&str>) -> DomainResult<UserId> {
        self.authenticate_at(authorization, Utc::now())
    }

    pub fn authenticate_at(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> DomainResult<UserId> {
        let token = extract_bearer(authorization).ok_or(DomainError::Unauthenticated)?;

        self.tokens.validate_at(token, now).map_err(|e| {
            tracing::debug!(reason = %e, "bearer token rejected");
            DomainError::Unauthenticated
        })
    }
}

/// Pull the token out of a `Bearer <token>` credential. The scheme name is
/// matched case-insensitively.
pub fn extract_bearer(header: Option<&str>) -> Option<&str> {
    let (scheme, token) = header?.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
