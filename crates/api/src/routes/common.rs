use crate::models::ErrorResponse;
use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(
            message.into(),
            "invalid_request_error".to_string(),
        )),
    )
}

pub fn bad_param(message: impl Into<String>, param: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::with_param(
            message.into(),
            "invalid_request_error".to_string(),
            param.to_string(),
        )),
    )
}

pub fn not_found(message: impl Into<String>) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(
            message.into(),
            "not_found_error".to_string(),
        )),
    )
}

pub fn unauthorized() -> ApiError {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(
            "Unauthorized".to_string(),
            "authentication_error".to_string(),
        )),
    )
}

/// Log the detail and return a generic message, so store errors never reach clients
pub fn internal_error(detail: impl std::fmt::Display) -> ApiError {
    tracing::error!(error = %detail, "Request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(
            "Internal server error".to_string(),
            "server_error".to_string(),
        )),
    )
}

/// Malformed or mistyped JSON bodies are client errors
pub fn json_rejection(rejection: JsonRejection) -> ApiError {
    bad_request(rejection.body_text())
}
