//! Admin-only endpoints.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::get,
};

use sweetshop_auth::{Operation, UserProfile};

use crate::app::{errors, services::AppServices};
use crate::authz::authorize;
use crate::context::PrincipalContext;
use crate::middleware::auth_middleware;

pub fn router() -> Router {
    Router::new().route("/users", get(list_users).layer(from_fn(auth_middleware)))
}

/// All accounts, oldest first. Password hashes never leave the auth crate.
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(e) = authorize(&principal, Operation::UsersList) {
        return errors::domain_error_to_response(e);
    }

    match services.auth.list_users().await {
        Ok(users) => {
            let profiles: Vec<UserProfile> = users.iter().map(|u| u.profile()).collect();
            Json(profiles).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
