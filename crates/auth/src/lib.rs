//! `sweetshop-auth`: authentication and authorization.
//!
//! Password hashing, token issuance, the access control guard, and the
//! registration/login engine. Storage is reached only through
//! [`CredentialStore`]; HTTP never appears here.

pub mod authorize;
pub mod claims;
pub mod engine;
pub mod password;
pub mod policy;
pub mod roles;
pub mod store;
pub mod token;
pub mod user;

pub use authorize::{AccessGuard, AuthzError};
pub use claims::{ClaimsError, TokenClaims, validate_claims};
pub use engine::{AuthEngine, AuthSession, Registration};
pub use password::{HashConfig, PasswordError, PasswordHasher};
pub use policy::Operation;
pub use roles::Role;
pub use store::CredentialStore;
pub use token::{DEFAULT_TOKEN_TTL_SECS, TokenError, TokenService};
pub use user::{NewUser, User, UserProfile};
