use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use sweetshop_auth::Operation;

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;
use crate::middleware::auth_middleware;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me).layer(from_fn(auth_middleware)))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> Response {
    let body = match errors::json_body(body) {
        Ok(b) => b,
        Err(res) => return res,
    };
    let registration = match body.validate() {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.auth.register(registration).await {
        Ok(session) => (
            StatusCode::CREATED,
            Json(dto::AuthResponse {
                user: session.user.profile(),
                token: session.token,
            }),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> Response {
    let body = match errors::json_body(body) {
        Ok(b) => b,
        Err(res) => return res,
    };
    if let Err(e) = body.validate() {
        return errors::domain_error_to_response(e);
    }

    match services.auth.login(&body.email, &body.password).await {
        Ok(session) => Json(dto::AuthResponse {
            user: session.user.profile(),
            token: session.token,
        })
        .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// The caller's current profile. A token whose user has since been removed
/// is treated as unauthenticated.
pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(e) = crate::authz::authorize(&principal, Operation::WhoAmI) {
        return errors::domain_error_to_response(e);
    }

    match services.auth.verify_user(principal.user_id()).await {
        Ok(user) => Json(user.profile()).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
