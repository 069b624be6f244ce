use crate::{
    models::{AskRequest, AskStreamEventSchema, ErrorResponse},
    routes::common::{bad_request, internal_error, json_rejection, ApiError},
    DomainServices,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures::stream::StreamExt;
use services::ask::{AskError, AskRequest as ServiceAskRequest};
use tracing::debug;

/// Ask a question and stream the answer
///
/// Runs web retrieval, then streams the model's answer as server-sent
/// events. Every frame is a single `data:` line holding one JSON event:
/// `meta` first, then any mix of `token`, `thinking` and `restart`, and
/// finally exactly one of `done` or `error`.
#[utoipa::path(
    post,
    path = "/v1/ask",
    tag = "Ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Answer stream", content_type = "text/event-stream", body = AskStreamEventSchema),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn ask(
    State(services): State<DomainServices>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.map_err(json_rejection)?;
    let (message, chat_id) = request.validate().map_err(bad_request)?;

    debug!(chat_id = ?chat_id, message_chars = message.chars().count(), "Ask request");

    let events = services
        .ask_service
        .ask(ServiceAskRequest {
            conversation_id: chat_id,
            message,
        })
        .await
        .map_err(|e| match e {
            AskError::InvalidParams(msg) => bad_request(msg),
            AskError::InternalError(msg) => internal_error(msg),
        })?;

    let frames = events.map(|event| Event::default().json_data(&event));

    Ok((
        [(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-transform"),
        )],
        Sse::new(frames).keep_alive(KeepAlive::default()),
    ))
}
