#![allow(dead_code)]

use api::{build_app, build_domain_services, Providers, Repositories};
use axum_test::TestServer;
use config::ApiConfig;
use inference_providers::MockProvider;
use services::search::{
    MockPageFetcherTrait, MockWebSearchProviderTrait, PageFetchError, WebDocument,
    WebSearchProviderTrait,
};
use services::testing::InMemoryStore;
use std::sync::Arc;

pub const ADMIN_TOKEN: &str = "test-admin-token";
pub const DAILY_CREDITS: i32 = 5;

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<InMemoryStore>,
    pub provider: Arc<MockProvider>,
}

/// Helper function to create a test configuration
pub fn test_config() -> ApiConfig {
    let mut config = ApiConfig::default();
    config.completion.preferred_models = vec!["model-a".to_string(), "model-b".to_string()];
    config.search.daily_credit_limit = DAILY_CREDITS;
    config.chat.system_prompt = "You are a test assistant.".to_string();
    config.admin.token = Some(ADMIN_TOKEN.to_string());
    config
}

/// Search stub returning `docs` for every query
pub fn search_returning(docs: Vec<WebDocument>) -> MockWebSearchProviderTrait {
    let mut search = MockWebSearchProviderTrait::new();
    search
        .expect_search()
        .returning(move |_, _| Ok(docs.clone()));
    search
}

/// Page fetcher that always fails, so documents keep their search snippets
pub fn offline_fetcher() -> MockPageFetcherTrait {
    let mut fetcher = MockPageFetcherTrait::new();
    fetcher
        .expect_fetch_text()
        .returning(|url| Err(PageFetchError::RequestFailed(format!("offline: {url}"))));
    fetcher
}

pub fn doc(n: usize) -> WebDocument {
    WebDocument {
        title: format!("Source {n}"),
        url: format!("https://source{n}.example/article"),
        snippet: format!("Snippet number {n}."),
    }
}

pub fn setup_test_server_with(
    provider: MockProvider,
    search: Option<MockWebSearchProviderTrait>,
    config: ApiConfig,
) -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let provider = Arc::new(provider);

    let repositories = Repositories {
        conversations: store.clone(),
        turns: store.clone(),
        feedback: store.clone(),
        credits: store.clone(),
        analytics: store.clone(),
        admin: store.clone(),
    };
    let providers = Providers {
        inference: provider.clone(),
        web_search: search.map(|s| Arc::new(s) as Arc<dyn WebSearchProviderTrait>),
        page_fetcher: Arc::new(offline_fetcher()),
    };

    let domain_services = build_domain_services(repositories, providers, &config);
    let app = build_app(domain_services, &config.server);

    TestApp {
        server: TestServer::new(app).unwrap(),
        store,
        provider,
    }
}

/// Server with the default mock model and no web search configured
pub fn setup_test_server() -> TestApp {
    setup_test_server_with(MockProvider::new(), None, test_config())
}

/// Split an SSE body into its JSON events, ignoring keep-alive comments
pub fn parse_sse_events(body: &str) -> Vec<serde_json::Value> {
    body.split("\n\n")
        .filter_map(|frame| frame.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).expect("frame holds valid JSON"))
        .collect()
}

pub async fn ask(server: &TestServer, body: serde_json::Value) -> Vec<serde_json::Value> {
    let response = server.post("/v1/ask").json(&body).await;
    response.assert_status_ok();
    parse_sse_events(&response.text())
}

/// Concatenated text of all events of `kind` (`token` or `thinking`)
pub fn joined_text(events: &[serde_json::Value], kind: &str) -> String {
    events
        .iter()
        .filter(|e| e["type"] == kind)
        .filter_map(|e| e["text"].as_str())
        .collect()
}

pub fn conversation_id(events: &[serde_json::Value]) -> String {
    assert_eq!(events[0]["type"], "meta", "first event must be meta");
    events[0]["conversationId"]
        .as_str()
        .expect("meta carries conversationId")
        .to_string()
}
