use api::{build_app, build_domain_services, init_database, init_providers, Repositories};
use config::{ApiConfig, LoggingConfig};

#[tokio::main]
async fn main() {
    // A missing .env file is fine; variables may come from the environment
    let _ = dotenvy::dotenv();

    // Load configuration first to get logging settings
    let config = ApiConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {e}");
        eprintln!("Application cannot start without a valid configuration.");
        std::process::exit(1);
    });

    init_tracing(&config.logging);

    let database = init_database(&config.database).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to initialize database");
        std::process::exit(1);
    });

    let providers = init_providers(&config).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to initialize upstream providers");
        std::process::exit(1);
    });

    let domain_services =
        build_domain_services(Repositories::from(database.as_ref()), providers, &config);
    let app = build_app(domain_services, &config.server);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(address = %bind_address, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    tracing::info!(
        address = %bind_address,
        models = ?config.completion.preferred_models,
        retrieval = config.search.api_key.is_some(),
        daily_search_credits = config.search.daily_credit_limit,
        "Server started successfully"
    );
    tracing::info!("API Endpoints:");
    tracing::info!("  - POST /v1/ask (Streamed answer)");
    tracing::info!("  - GET/POST/DELETE /v1/chats");
    tracing::info!("  - GET/POST /v1/messages");
    tracing::info!("  - POST /v1/events");
    tracing::info!("  - GET /v1/admin/stats");
    tracing::info!("  - GET /api-docs/openapi.json");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections");
}

fn init_tracing(logging_config: &LoggingConfig) {
    let mut filter = logging_config.level.clone();

    for (module, level) in &logging_config.modules {
        filter.push_str(&format!(",{module}={level}"));
    }

    match logging_config.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        "compact" => {
            tracing_subscriber::fmt()
                .compact()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .init();
        }
    }
}
