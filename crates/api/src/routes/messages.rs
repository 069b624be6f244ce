use crate::{
    models::{ErrorResponse, FeedbackObject, FeedbackRequest, ListMessagesQuery, MessageObject},
    routes::common::{
        bad_param, bad_request, internal_error, json_rejection, not_found, ApiError,
    },
    DomainServices,
};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use services::{
    conversations::{ConversationError, ConversationId},
    feedback::FeedbackError,
};

/// List the messages of a conversation, oldest first
///
/// An unknown conversation yields an empty list.
#[utoipa::path(
    get,
    path = "/v1/messages",
    tag = "Messages",
    params(ListMessagesQuery),
    responses(
        (status = 200, description = "Messages", body = Vec<MessageObject>),
        (status = 400, description = "Missing or malformed chatId", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_messages(
    State(services): State<DomainServices>,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<Vec<MessageObject>>, ApiError> {
    let raw_id = query
        .chat_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| bad_param("chatId is required", "chatId"))?;
    let conversation_id: ConversationId = raw_id
        .parse()
        .map_err(|e: ConversationError| bad_param(e.to_string(), "chatId"))?;

    let turns = services
        .conversation_service
        .list_turns(conversation_id)
        .await
        .map_err(internal_error)?;

    Ok(Json(turns.into_iter().map(Into::into).collect()))
}

/// Like or dislike a message
#[utoipa::path(
    post,
    path = "/v1/messages",
    tag = "Messages",
    request_body = FeedbackRequest,
    responses(
        (status = 201, description = "Feedback stored", body = FeedbackObject),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Message not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn submit_feedback(
    State(services): State<DomainServices>,
    body: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FeedbackObject>), ApiError> {
    let Json(request) = body.map_err(json_rejection)?;

    let feedback = services
        .feedback_service
        .submit_feedback(&request.message_id, request.r#type, request.comment)
        .await
        .map_err(|e| match e {
            FeedbackError::InvalidParams(msg) => bad_request(msg),
            FeedbackError::NotFound(msg) => not_found(msg),
            FeedbackError::InternalError(msg) => internal_error(msg),
        })?;

    Ok((StatusCode::CREATED, Json(feedback.into())))
}
