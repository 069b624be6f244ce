use crate::{
    models::{CreateEventRequest, ErrorResponse},
    routes::common::{bad_request, internal_error, json_rejection, ApiError},
    DomainServices,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use services::analytics::AnalyticsError;

/// Record a client-side analytics event
#[utoipa::path(
    post,
    path = "/v1/events",
    tag = "Analytics",
    request_body = CreateEventRequest,
    responses(
        (status = 204, description = "Event recorded"),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn record_event(
    State(services): State<DomainServices>,
    body: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = body.map_err(json_rejection)?;

    services
        .analytics_service
        .record_event(&request.name, request.properties)
        .await
        .map_err(|e| match e {
            AnalyticsError::InvalidParams(msg) => bad_request(msg),
            AnalyticsError::InternalError(msg) => internal_error(msg),
        })?;

    Ok(StatusCode::NO_CONTENT)
}
