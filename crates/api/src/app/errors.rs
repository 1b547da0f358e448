use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use sweetshop_core::{DomainError, ErrorKind};

pub fn domain_error_to_response(err: DomainError) -> Response {
    let status = status_for(err.kind());
    match err {
        DomainError::Validation(msg) => json_error(status, ErrorKind::Validation.code(), msg),
        DomainError::NotFound(entity) => {
            json_error(status, ErrorKind::NotFound.code(), format!("{entity} not found"))
        }
        DomainError::Conflict(msg) => json_error(status, ErrorKind::Conflict.code(), msg),
        DomainError::InvalidCredentials => json_error(
            status,
            ErrorKind::InvalidCredentials.code(),
            "invalid email or password",
        ),
        DomainError::Unauthenticated(msg) => {
            json_error(status, ErrorKind::Unauthenticated.code(), msg)
        }
        // Token failures surface exactly like a missing token.
        DomainError::InvalidToken(msg) => {
            tracing::debug!(reason = %msg, "invalid token");
            json_error(
                status,
                ErrorKind::Unauthenticated.code(),
                "invalid or expired token",
            )
        }
        DomainError::Forbidden(msg) => json_error(status, ErrorKind::Forbidden.code(), msg),
        DomainError::InsufficientStock {
            requested,
            available,
        } => (
            status,
            axum::Json(json!({
                "error": ErrorKind::InsufficientStock.code(),
                "message": format!("insufficient stock: requested {requested}, only {available} available"),
                "requested": requested,
                "available": available,
            })),
        )
            .into_response(),
        DomainError::Internal(detail) => {
            tracing::error!(error = %detail, "internal error");
            json_error(status, ErrorKind::Internal.code(), "internal server error")
        }
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::InvalidCredentials | ErrorKind::Unauthenticated | ErrorKind::InvalidToken => {
            StatusCode::UNAUTHORIZED
        }
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict | ErrorKind::InsufficientStock => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Unwrap a JSON body, turning extractor rejections into our error envelope.
pub fn json_body<T>(body: Result<axum::Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|axum::Json(value)| value).map_err(|rejection| {
        json_error(
            StatusCode::BAD_REQUEST,
            ErrorKind::Validation.code(),
            rejection.body_text(),
        )
    })
}

pub fn query_params<T>(query: Result<axum::extract::Query<T>, QueryRejection>) -> Result<T, Response> {
    query
        .map(|axum::extract::Query(value)| value)
        .map_err(|rejection| {
            json_error(
                StatusCode::BAD_REQUEST,
                ErrorKind::Validation.code(),
                rejection.body_text(),
            )
        })
}
