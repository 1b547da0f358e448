//! Domain error model.
//!
//! Every failure the service can surface to a caller is one of the variants of
//! [`DomainError`]. Callers branch on [`DomainError::kind`], never on messages.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Closed set of externally visible error kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    InvalidCredentials,
    Unauthenticated,
    Forbidden,
    InsufficientStock,
    InvalidToken,
    Internal,
}

impl ErrorKind {
    /// Stable, machine-readable code for the kind.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::InvalidCredentials => "invalid_credentials",
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::InsufficientStock => "insufficient_stock",
            ErrorKind::InvalidToken => "invalid_token",
            ErrorKind::Internal => "internal_error",
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// Domain-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed input, correctable by the caller.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness rule was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Login failed. Deliberately silent about which half was wrong.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A purchase asked for more than the item currently holds.
    #[error("insufficient stock: requested {requested}, only {available} available")]
    InsufficientStock { requested: i64, available: i64 },

    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Unanticipated failure (storage, task join, ...). Detail is for logs only.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound(entity)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::Conflict(_) => ErrorKind::Conflict,
            DomainError::InvalidCredentials => ErrorKind::InvalidCredentials,
            DomainError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            DomainError::Forbidden(_) => ErrorKind::Forbidden,
            DomainError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            DomainError::InvalidToken(_) => ErrorKind::InvalidToken,
            DomainError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Failure reported by a storage backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    /// The backend failed (connection, poisoned lock, decode, ...).
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => DomainError::Conflict(msg),
            StoreError::Backend(msg) => DomainError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_have_distinct_codes() {
        let kinds = [
            ErrorKind::Validation,
            ErrorKind::NotFound,
            ErrorKind::Conflict,
            ErrorKind::InvalidCredentials,
            ErrorKind::Unauthenticated,
            ErrorKind::Forbidden,
            ErrorKind::InsufficientStock,
            ErrorKind::InvalidToken,
            ErrorKind::Internal,
        ];
        let codes: std::collections::HashSet<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn store_conflict_maps_to_domain_conflict() {
        let err: DomainError = StoreError::Conflict("users.email".into()).into();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err: DomainError = StoreError::backend("pool closed").into();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn insufficient_stock_reports_available_quantity() {
        let err = DomainError::InsufficientStock {
            requested: 5,
            available: 2,
        };
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
        assert!(err.to_string().contains("only 2 available"));
    }
}
