use axum::Router;

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod system;

/// Everything under `/api`. Guards are attached per route inside each area.
pub fn router() -> Router {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/sweets", catalog::router())
        .nest("/admin", admin::router())
}
