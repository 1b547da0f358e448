//! Access control guard: bearer extraction, token verification, role check.
//!
//! - No storage IO
//! - No panics
//! - `authenticate` then `authorize`, always in that order

use std::sync::Arc;

use thiserror::Error;

use sweetshop_core::DomainError;

use crate::{Operation, Role, TokenClaims, TokenService};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// Missing, malformed, forged, or expired credential.
    #[error("unauthenticated: {0}")]
    Unauthenticated(&'static str),

    /// Valid identity, insufficient role.
    #[error("forbidden: role {role} may not perform this operation")]
    Forbidden { role: Role },
}

impl From<AuthzError> for DomainError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::Unauthenticated(msg) => DomainError::unauthenticated(msg),
            AuthzError::Forbidden { .. } => DomainError::forbidden(value.to_string()),
        }
    }
}

/// Admits or rejects inbound calls based on their bearer credential.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    tokens: Arc<TokenService>,
}

impl AccessGuard {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Resolve an `Authorization` header value into verified claims.
    ///
    /// Token-level failures are collapsed into `Unauthenticated`; the cause is
    /// only logged.
    pub fn authenticate(&self, raw_header: Option<&str>) -> Result<TokenClaims, AuthzError> {
        let header = raw_header.ok_or(AuthzError::Unauthenticated("no token provided"))?;
        let token = extract_bearer(header)?;

        self.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "bearer token rejected");
            AuthzError::Unauthenticated("invalid or expired token")
        })
    }

    /// Check that the caller's role is one of `allowed`.
    pub fn authorize(claims: Option<&TokenClaims>, allowed: &[Role]) -> Result<(), AuthzError> {
        let claims = claims.ok_or(AuthzError::Unauthenticated("authentication required"))?;

        if allowed.contains(&claims.role) {
            Ok(())
        } else {
            Err(AuthzError::Forbidden { role: claims.role })
        }
    }

    /// `authenticate` + `authorize` against the policy for `operation`.
    pub fn admit(&self, raw_header: Option<&str>, operation: Operation) -> Result<TokenClaims, AuthzError> {
        let claims = self.authenticate(raw_header)?;
        Self::authorize(Some(&claims), &operation.allowed_roles())?;
        Ok(claims)
    }
}

fn extract_bearer(header: &str) -> Result<&str, AuthzError> {
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthzError::Unauthenticated("no token provided"))?
        .trim();

    if token.is_empty() {
        return Err(AuthzError::Unauthenticated("no token provided"));
    }
    Ok(token)
}
