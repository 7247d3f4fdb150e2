use core::fmt::Display;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use accountsys_accounts::ServiceError;
use accountsys_core::DomainError;

pub fn service_error_to_response(err: ServiceError) -> Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Repository(e) => unhandled(e),
    }
}

/// Not-found kinds → 404 with the message as a plain-text body; validation →
/// 400 with a field → message object.
pub fn domain_error_to_response(err: DomainError) -> Response {
    if err.is_not_found() {
        return (StatusCode::NOT_FOUND, err.to_string()).into_response();
    }
    match err {
        DomainError::Validation(fields) => (StatusCode::BAD_REQUEST, Json(fields)).into_response(),
        other => unhandled(other),
    }
}

/// Fallback for anything without a dedicated mapping.
pub fn unhandled(err: impl Display) -> Response {
    tracing::error!(error = %err, "unhandled failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Error occurred: {err}"),
    )
        .into_response()
}

/// Unreadable request bodies have no dedicated mapping either.
pub fn json_rejection(rejection: JsonRejection) -> Response {
    unhandled(rejection.body_text())
}

/// Path segments that don't parse as ids fall through to the generic handler.
pub fn path_rejection(rejection: PathRejection) -> Response {
    unhandled(rejection.body_text())
}
