use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};

use sweetshop_auth::Operation;
use sweetshop_core::ItemId;

use crate::app::{dto, errors, services::AppServices};
use crate::authz::authorize;
use crate::context::PrincipalContext;
use crate::middleware::auth_middleware;

/// Reads are public; every mutation sits behind the auth middleware and a
/// role check.
pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_items).merge(post(create_item).layer(from_fn(auth_middleware))),
        )
        .route("/search", get(search_items))
        .route(
            "/:id",
            get(get_item).merge(
                put(update_item)
                    .delete(delete_item)
                    .layer(from_fn(auth_middleware)),
            ),
        )
        .route(
            "/:id/purchase",
            post(purchase_item).layer(from_fn(auth_middleware)),
        )
        .route(
            "/:id/restock",
            post(restock_item).layer(from_fn(auth_middleware)),
        )
}

fn parse_id(raw: &str) -> Result<ItemId, Response> {
    raw.parse().map_err(errors::domain_error_to_response)
}

macro_rules! try_response {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(res) => return res,
        }
    };
}

pub async fn list_items(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.inventory.get_all().await {
        Ok(items) => Json(items).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn search_items(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::SearchQuery>, QueryRejection>,
) -> Response {
    let query = try_response!(errors::query_params(query));
    let filter = try_response!(query.validate().map_err(errors::domain_error_to_response));

    match services.inventory.search(filter).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id = try_response!(parse_id(&id));

    match services.inventory.get_by_id(id).await {
        Ok(item) => Json(item).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::CreateItemRequest>, JsonRejection>,
) -> Response {
    if let Err(e) = authorize(&principal, Operation::CatalogCreate) {
        return errors::domain_error_to_response(e);
    }
    let body = try_response!(errors::json_body(body));
    let input = try_response!(body.validate().map_err(errors::domain_error_to_response));

    match services.inventory.create(input).await {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateItemRequest>, JsonRejection>,
) -> Response {
    if let Err(e) = authorize(&principal, Operation::CatalogUpdate) {
        return errors::domain_error_to_response(e);
    }
    let id = try_response!(parse_id(&id));
    let body = try_response!(errors::json_body(body));
    let patch = try_response!(body.validate().map_err(errors::domain_error_to_response));

    match services.inventory.update(id, patch).await {
        Ok(item) => Json(item).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(e) = authorize(&principal, Operation::CatalogDelete) {
        return errors::domain_error_to_response(e);
    }
    let id = try_response!(parse_id(&id));

    match services.inventory.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn purchase_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::QuantityRequest>, JsonRejection>,
) -> Response {
    if let Err(e) = authorize(&principal, Operation::CatalogPurchase) {
        return errors::domain_error_to_response(e);
    }
    let id = try_response!(parse_id(&id));
    let body = try_response!(errors::json_body(body));

    match services.inventory.purchase(id, body.quantity).await {
        Ok(item) => {
            tracing::info!(user_id = %principal.user_id(), item_id = %id, quantity = body.quantity, "purchase");
            Json(item).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn restock_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::QuantityRequest>, JsonRejection>,
) -> Response {
    if let Err(e) = authorize(&principal, Operation::CatalogRestock) {
        return errors::domain_error_to_response(e);
    }
    let id = try_response!(parse_id(&id));
    let body = try_response!(errors::json_body(body));

    match services.inventory.restock(id, body.quantity).await {
        Ok(item) => Json(item).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
