//! Role checks at the handler boundary, before any engine call.

use sweetshop_auth::{AccessGuard, Operation};
use sweetshop_core::DomainError;

use crate::context::PrincipalContext;

pub fn authorize(principal: &PrincipalContext, operation: Operation) -> Result<(), DomainError> {
    AccessGuard::authorize(Some(principal.claims()), &operation.allowed_roles()).map_err(|e| {
        tracing::info!(
            user_id = %principal.user_id(),
            role = %principal.role(),
            operation = operation.name(),
            "operation denied"
        );
        e.into()
    })
}
