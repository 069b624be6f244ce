use crate::models::*;
use crate::routes::health::HealthResponse;
use services::{conversations::TurnRole, feedback::FeedbackType};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Retrieval Chat API",
        description = "Ask questions and receive streamed answers grounded in live web sources, with cited references.\n\n## Streaming\n\n`POST /v1/ask` answers with `text/event-stream`. Each frame is one `data:` line holding a JSON event tagged by `type`.\n\n## Admin\n\nAdmin endpoints require the `x-admin-token` header.",
        version = "1.0.0",
        license(
            name = "MIT",
        )
    ),
    paths(
        crate::routes::ask::ask,
        crate::routes::chats::list_chats,
        crate::routes::chats::create_chat,
        crate::routes::chats::delete_chat,
        crate::routes::messages::list_messages,
        crate::routes::messages::submit_feedback,
        crate::routes::events::record_event,
        crate::routes::admin::get_stats,
        crate::routes::health::health_check,
    ),
    components(
        schemas(
            ErrorResponse, ErrorDetail,
            AskRequest, AskStreamEventSchema, CitationObject,
            CreateChatRequest, ChatObject, ChatDeleteResult,
            MessageObject, TurnRole, FeedbackRequest, FeedbackObject, FeedbackType,
            CreateEventRequest,
            AdminStatsResponse, CreditLedgerObject,
            HealthResponse,
        ),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security configuration for OpenAPI
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-admin-token"))),
            );
        }
    }
}
