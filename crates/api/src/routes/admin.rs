use crate::{
    models::{AdminStatsResponse, ErrorResponse},
    routes::common::{internal_error, unauthorized, ApiError},
    DomainServices,
};
use axum::{extract::State, http::HeaderMap, Json};
use services::admin::AdminError;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Store-wide counters and the search credit ledger
#[utoipa::path(
    get,
    path = "/v1/admin/stats",
    tag = "Admin",
    params(
        ("x-admin-token" = String, Header, description = "Admin token")
    ),
    responses(
        (status = 200, description = "Statistics", body = AdminStatsResponse),
        (status = 401, description = "Missing or wrong admin token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_stats(
    State(services): State<DomainServices>,
    headers: HeaderMap,
) -> Result<Json<AdminStatsResponse>, ApiError> {
    let presented = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    let map_error = |e: AdminError| match e {
        AdminError::Unauthorized => unauthorized(),
        AdminError::InternalError(msg) => internal_error(msg),
    };

    services.admin_service.authorize(presented).map_err(map_error)?;
    let stats = services.admin_service.get_stats().await.map_err(map_error)?;

    Ok(Json(stats.into()))
}
