use crate::{
    models::{ChatDeleteResult, ChatObject, CreateChatRequest, DeleteChatQuery, ErrorResponse},
    routes::common::{bad_param, bad_request, internal_error, not_found, ApiError},
    DomainServices,
};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use services::conversations::{ConversationError, ConversationId};
use tracing::{debug, info};

fn map_conversation_error(error: ConversationError) -> ApiError {
    match error {
        ConversationError::InvalidParams(msg) => bad_request(msg),
        ConversationError::NotFound(msg) => not_found(msg),
        ConversationError::InternalError(msg) => internal_error(msg),
    }
}

/// List conversations, most recently updated first
#[utoipa::path(
    get,
    path = "/v1/chats",
    tag = "Chats",
    responses(
        (status = 200, description = "Conversations", body = Vec<ChatObject>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_chats(
    State(services): State<DomainServices>,
) -> Result<Json<Vec<ChatObject>>, ApiError> {
    let conversations = services
        .conversation_service
        .list_conversations()
        .await
        .map_err(map_conversation_error)?;

    Ok(Json(conversations.into_iter().map(Into::into).collect()))
}

/// Create an empty conversation
///
/// The body is optional; a missing or blank title becomes "New Chat".
#[utoipa::path(
    post,
    path = "/v1/chats",
    tag = "Chats",
    request_body = CreateChatRequest,
    responses(
        (status = 201, description = "Conversation created", body = ChatObject),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_chat(
    State(services): State<DomainServices>,
    body: Bytes,
) -> Result<(StatusCode, Json<ChatObject>), ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CreateChatRequest::default()
    } else {
        serde_json::from_slice::<CreateChatRequest>(&body)
            .map_err(|e| bad_request(format!("Invalid request body: {e}")))?
    };

    let conversation = services
        .conversation_service
        .create_conversation(request.title)
        .await
        .map_err(map_conversation_error)?;

    info!(conversation_id = %conversation.id, "Created chat");
    Ok((StatusCode::CREATED, Json(conversation.into())))
}

/// Delete a conversation with all its messages and their feedback
#[utoipa::path(
    delete,
    path = "/v1/chats",
    tag = "Chats",
    params(DeleteChatQuery),
    responses(
        (status = 200, description = "Conversation deleted", body = ChatDeleteResult),
        (status = 400, description = "Missing or malformed id", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn delete_chat(
    State(services): State<DomainServices>,
    Query(query): Query<DeleteChatQuery>,
) -> Result<Json<ChatDeleteResult>, ApiError> {
    let raw_id = query
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| bad_param("id is required", "id"))?;
    let conversation_id: ConversationId = raw_id
        .parse()
        .map_err(|e: ConversationError| bad_param(e.to_string(), "id"))?;

    debug!(conversation_id = %conversation_id, "Delete chat request");

    let deleted = services
        .conversation_service
        .delete_conversation(conversation_id)
        .await
        .map_err(map_conversation_error)?;

    if !deleted {
        return Err(not_found("Conversation not found"));
    }

    Ok(Json(ChatDeleteResult {
        id: conversation_id.to_string(),
        deleted: true,
    }))
}
