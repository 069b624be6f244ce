pub mod models;
pub mod openapi;
pub mod routes;

use crate::{
    openapi::ApiDoc,
    routes::{admin, ask, chats, events, health, messages},
};
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use config::{ApiConfig, ServerConfig};
use database::Database;
use inference_providers::{InferenceProvider, OpenAiCompatibleConfig, OpenAiCompatibleProvider};
use services::{
    admin::{AdminRepository, AdminServiceTrait},
    analytics::{AnalyticsRepository, AnalyticsServiceTrait},
    ask::AskServiceTrait,
    conversations::{ConversationRepository, ConversationServiceTrait, TurnRepository},
    credits::{CreditRepository, CreditServiceTrait},
    feedback::{FeedbackRepository, FeedbackServiceTrait},
    search::{
        HttpPageFetcher, PageFetcherTrait, TavilyWebSearchProvider, WebSearchProviderTrait,
    },
    AdminServiceImpl, AnalyticsServiceImpl, AskServiceImpl, CompletionServiceImpl,
    ConversationServiceImpl, CreditServiceImpl, FeedbackServiceImpl, RetrievalServiceImpl,
};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
};
use utoipa::OpenApi;

/// Services shared by every route handler
#[derive(Clone)]
pub struct DomainServices {
    pub ask_service: Arc<dyn AskServiceTrait>,
    pub conversation_service: Arc<dyn ConversationServiceTrait>,
    pub feedback_service: Arc<dyn FeedbackServiceTrait>,
    pub analytics_service: Arc<dyn AnalyticsServiceTrait>,
    pub admin_service: Arc<dyn AdminServiceTrait>,
}

/// Storage ports the services are built on
#[derive(Clone)]
pub struct Repositories {
    pub conversations: Arc<dyn ConversationRepository>,
    pub turns: Arc<dyn TurnRepository>,
    pub feedback: Arc<dyn FeedbackRepository>,
    pub credits: Arc<dyn CreditRepository>,
    pub analytics: Arc<dyn AnalyticsRepository>,
    pub admin: Arc<dyn AdminRepository>,
}

impl From<&Database> for Repositories {
    fn from(database: &Database) -> Self {
        Self {
            conversations: database.conversations.clone(),
            turns: database.turns.clone(),
            feedback: database.feedback.clone(),
            credits: database.credits.clone(),
            analytics: database.analytics.clone(),
            admin: database.admin.clone(),
        }
    }
}

/// Upstream clients: completion gateway, web search and page fetching
#[derive(Clone)]
pub struct Providers {
    pub inference: Arc<dyn InferenceProvider>,
    /// `None` disables retrieval
    pub web_search: Option<Arc<dyn WebSearchProviderTrait>>,
    pub page_fetcher: Arc<dyn PageFetcherTrait>,
}

/// Initialize database connection and run migrations
pub async fn init_database(db_config: &config::DatabaseConfig) -> anyhow::Result<Arc<Database>> {
    let database = Arc::new(Database::from_config(db_config).await?);

    tracing::info!("Starting database migrations...");
    database.run_migrations().await?;
    tracing::info!("Database migrations completed.");

    Ok(database)
}

/// Build the HTTP clients for every upstream the service talks to
pub fn init_providers(config: &ApiConfig) -> anyhow::Result<Providers> {
    let mut extra_headers = HashMap::new();
    extra_headers.insert("X-Title".to_string(), "Retrieval Chat".to_string());

    let inference = OpenAiCompatibleProvider::new(OpenAiCompatibleConfig {
        base_url: config.completion.base_url.clone(),
        api_key: config.completion.api_key.clone(),
        timeout_seconds: config.completion.timeout_seconds,
        extra_headers,
    })?;
    if config.completion.api_key.is_none() {
        tracing::warn!("OPENROUTER_API_KEY not set, completion requests will likely be rejected");
    }

    let page_timeout = Duration::from_secs(config.search.page_fetch_timeout_secs);
    let web_search: Option<Arc<dyn WebSearchProviderTrait>> = match &config.search.api_key {
        Some(api_key) => Some(Arc::new(TavilyWebSearchProvider::new(
            api_key.clone(),
            config.search.base_url.clone(),
            page_timeout,
        )?)),
        None => {
            tracing::info!("TAVILY_API_KEY not set, answering without web retrieval");
            None
        }
    };
    let page_fetcher = HttpPageFetcher::new(page_timeout, config.search.page_max_chars)?;

    Ok(Providers {
        inference: Arc::new(inference),
        web_search,
        page_fetcher: Arc::new(page_fetcher),
    })
}

/// Wire the domain services on top of the given repositories and providers
pub fn build_domain_services(
    repositories: Repositories,
    providers: Providers,
    config: &ApiConfig,
) -> DomainServices {
    let credit_service: Arc<dyn CreditServiceTrait> = Arc::new(CreditServiceImpl::new(
        repositories.credits,
        config.search.daily_credit_limit,
    ));

    let conversation_service = Arc::new(ConversationServiceImpl::new(
        repositories.conversations,
        repositories.turns.clone(),
        config.chat.title_max_chars,
    ));

    let retrieval_service = Arc::new(RetrievalServiceImpl::new(
        providers.web_search,
        providers.page_fetcher,
        credit_service.clone(),
        config.search.max_results,
    ));

    let reasoning_effort =
        Some(config.completion.reasoning_effort.clone()).filter(|effort| !effort.is_empty());
    let completion_service = Arc::new(CompletionServiceImpl::new(
        providers.inference,
        config.completion.preferred_models.clone(),
        reasoning_effort,
    ));

    let analytics_service = Arc::new(AnalyticsServiceImpl::new(repositories.analytics));

    let ask_service = Arc::new(AskServiceImpl::new(
        conversation_service.clone(),
        retrieval_service,
        completion_service,
        analytics_service.clone(),
        config.chat.system_prompt.clone(),
    ));

    let feedback_service = Arc::new(FeedbackServiceImpl::new(
        repositories.feedback,
        repositories.turns,
    ));

    let admin_service = Arc::new(AdminServiceImpl::new(
        repositories.admin,
        credit_service,
        config.admin.token.clone(),
    ));

    DomainServices {
        ask_service,
        conversation_service,
        feedback_service,
        analytics_service,
        admin_service,
    }
}

/// Build the complete application router
pub fn build_app(domain_services: DomainServices, server_config: &ServerConfig) -> Router {
    let api_routes = Router::new()
        .route("/ask", post(ask::ask))
        .route(
            "/chats",
            get(chats::list_chats)
                .post(chats::create_chat)
                .delete(chats::delete_chat),
        )
        .route(
            "/messages",
            get(messages::list_messages).post(messages::submit_feedback),
        )
        .route("/events", post(events::record_event))
        .route("/admin/stats", get(admin::get_stats))
        .route("/health", get(health::health_check))
        .with_state(domain_services);

    let mut app = Router::new()
        .nest("/v1", api_routes)
        .merge(build_openapi_routes());

    if let Some(cors) = build_cors_layer(&server_config.cors_allowed_origins) {
        app = app.layer(cors);
    }

    with_security_headers(app)
}

/// Build OpenAPI documentation routes
pub fn build_openapi_routes() -> Router {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { axum::Json(ApiDoc::openapi()) }),
    )
}

fn with_security_headers(router: Router) -> Router {
    router
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
}

/// CORS for the configured origins. `*` allows any origin, an empty list
/// leaves CORS handling off.
fn build_cors_layer(allowed_origins: &[String]) -> Option<CorsLayer> {
    if allowed_origins.is_empty() {
        return None;
    }

    let allow_origin = if allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([
                header::CONTENT_TYPE,
                header::ACCEPT,
                HeaderName::from_static("x-admin-token"),
            ]),
    )
}
