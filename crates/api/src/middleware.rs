use std::sync::Arc;

use axum::{
    extract::{Extension, Request},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

/// Reject the request unless it carries a valid bearer token.
///
/// On success the caller's [`PrincipalContext`] is attached to the request.
/// A header that is not valid UTF-8 counts as absent.
pub async fn auth_middleware(
    Extension(services): Extension<Arc<AppServices>>,
    mut req: Request,
    next: Next,
) -> Response {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match services.guard.authenticate(header) {
        Ok(claims) => {
            req.extensions_mut().insert(PrincipalContext::new(claims));
            next.run(req).await
        }
        Err(e) => errors::domain_error_to_response(e.into()),
    }
}
