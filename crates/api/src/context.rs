use sweetshop_auth::{Role, TokenClaims};
use sweetshop_core::UserId;

/// Authenticated caller for a request, built from verified token claims.
///
/// Inserted by [`crate::middleware::auth_middleware`]; handlers behind that
/// middleware can extract it with `Extension<PrincipalContext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    claims: TokenClaims,
}

impl PrincipalContext {
    pub fn new(claims: TokenClaims) -> Self {
        Self { claims }
    }

    pub fn user_id(&self) -> UserId {
        self.claims.user_id()
    }

    pub fn role(&self) -> Role {
        self.claims.role
    }

    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }
}
