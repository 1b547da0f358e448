use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sweetshop_core::{Email, UserId};

use crate::{Role, User};

/// Identity payload carried inside a signed token.
///
/// A point-in-time snapshot of the user: later profile or role changes are not
/// reflected until a new token is issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user id).
    pub sub: UserId,

    pub email: Email,

    #[serde(rename = "firstName")]
    pub first_name: String,

    #[serde(rename = "lastName")]
    pub last_name: String,

    pub role: Role,

    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,

    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl TokenClaims {
    /// Derive claims for `user`, valid for `ttl` starting at `now`.
    pub fn for_user(user: &User, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.sub
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time window of decoded claims.
///
/// Signature verification happens in [`crate::TokenService`]; this only looks at
/// the timestamps.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), ClaimsError> {
    if claims.exp <= claims.iat {
        return Err(ClaimsError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(ClaimsError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(ClaimsError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewUser;

    fn user() -> User {
        NewUser {
            email: Email::parse("sam@example.com").unwrap(),
            password_hash: String::new(),
            first_name: "Sam".to_string(),
            last_name: "Lee".to_string(),
            role: Role::Admin,
        }
        .into_user(Utc::now())
    }

    #[test]
    fn claims_snapshot_the_user() {
        let u = user();
        let now = Utc::now();
        let claims = TokenClaims::for_user(&u, now, Duration::days(7));
        assert_eq!(claims.user_id(), u.id);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
        assert_eq!(claims.iat, now.timestamp());
    }

    #[test]
    fn time_window_checks() {
        let now = Utc::now();
        let claims = TokenClaims::for_user(&user(), now, Duration::minutes(10));

        assert_eq!(validate_claims(&claims, now), Ok(()));
        assert_eq!(
            validate_claims(&claims, now + Duration::minutes(10)),
            Err(ClaimsError::Expired)
        );
        assert_eq!(
            validate_claims(&claims, now - Duration::minutes(1)),
            Err(ClaimsError::NotYetValid)
        );

        let inverted = TokenClaims::for_user(&user(), now, Duration::minutes(-1));
        assert_eq!(validate_claims(&inverted, now), Err(ClaimsError::InvalidTimeWindow));
    }
}
