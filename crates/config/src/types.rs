use serde::Deserialize;
use std::{collections::HashMap, env, str::FromStr};

pub const DEFAULT_PREFERRED_MODELS: &str =
    "deepseek/deepseek-chat,meta-llama/llama-3.1-70b-instruct";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful research assistant. \
Answer clearly and accurately. When sources are provided, ground your answer in them \
and cite them with bracketed numbers like [1]. If the sources do not cover the question, \
say so and answer from general knowledge.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            search: SearchConfig::from_env()?,
            completion: CompletionConfig::from_env()?,
            chat: ChatConfig::from_env()?,
            admin: AdminConfig::from_env()?,
        })
    }
}

/// Parse an optional environment variable, falling back to `default` when unset.
fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

/// Non-empty environment variable, `None` when unset or blank.
fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Split a comma-separated list, dropping blanks. Order is preserved.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_max_connections() -> usize {
    5
}

impl DatabaseConfig {
    /// Create a connection URL for this database configuration
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            host: env::var("DATABASE_HOST").map_err(|_| "DATABASE_HOST not set")?,
            port: env::var("DATABASE_PORT")
                .map_err(|_| "DATABASE_PORT not set")?
                .parse()
                .map_err(|_| "DATABASE_PORT must be a valid port number")?,
            database: env::var("DATABASE_NAME").map_err(|_| "DATABASE_NAME not set")?,
            username: env::var("DATABASE_USERNAME").map_err(|_| "DATABASE_USERNAME not set")?,
            password: env::var("DATABASE_PASSWORD").map_err(|_| "DATABASE_PASSWORD not set")?,
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", default_max_connections())?,
        })
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "chat_api".to_string(),
            username: "postgres".to_string(),
            password: "postgres".to_string(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by the CORS layer. Empty disables CORS handling.
    pub cors_allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| "SERVER_PORT must be a valid port number")?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|raw| parse_list(&raw))
                .unwrap_or_default(),
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub modules: HashMap<String, String>,
}

impl LoggingConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, String> {
        let mut modules = HashMap::new();

        // Load module-specific log levels
        for (var, module) in [
            ("LOG_MODULE_API", "api"),
            ("LOG_MODULE_SERVICES", "services"),
            ("LOG_MODULE_DATABASE", "database"),
            ("LOG_MODULE_INFERENCE_PROVIDERS", "inference_providers"),
        ] {
            if let Ok(level) = env::var(var) {
                modules.insert(module.to_string(), level);
            }
        }

        Ok(Self {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            modules,
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let mut modules = HashMap::new();
        modules.insert("api".to_string(), "debug".to_string());
        modules.insert("services".to_string(), "debug".to_string());

        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            modules,
        }
    }
}

/// Web search and page retrieval settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search provider key. Retrieval is skipped entirely when absent.
    pub api_key: Option<String>,
    pub base_url: String,
    pub max_results: u32,
    /// Search calls allowed per UTC day.
    pub daily_credit_limit: i32,
    pub page_fetch_timeout_secs: u64,
    /// Maximum characters of extracted page text kept per document.
    pub page_max_chars: usize,
}

impl SearchConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();
        Ok(Self {
            api_key: env_opt("TAVILY_API_KEY"),
            base_url: env::var("TAVILY_BASE_URL").unwrap_or(defaults.base_url),
            max_results: env_or("SEARCH_MAX_RESULTS", defaults.max_results)?,
            daily_credit_limit: env_or("DAILY_SEARCH_CREDIT_LIMIT", defaults.daily_credit_limit)?,
            page_fetch_timeout_secs: env_or(
                "PAGE_FETCH_TIMEOUT_SECS",
                defaults.page_fetch_timeout_secs,
            )?,
            page_max_chars: env_or("PAGE_SNIPPET_MAX_CHARS", defaults.page_max_chars)?,
        })
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.tavily.com".to_string(),
            max_results: 6,
            daily_credit_limit: 200,
            page_fetch_timeout_secs: 15,
            page_max_chars: 2000,
        }
    }
}

/// Upstream completion gateway settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Candidate models, most preferred first.
    pub preferred_models: Vec<String>,
    pub reasoning_effort: String,
    pub timeout_seconds: u64,
}

impl CompletionConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();
        Ok(Self {
            api_key: env_opt("OPENROUTER_API_KEY"),
            base_url: env::var("OPENROUTER_BASE_URL").unwrap_or(defaults.base_url),
            preferred_models: env::var("OPENROUTER_PREFERRED_MODELS")
                .map(|raw| parse_list(&raw))
                .unwrap_or(defaults.preferred_models),
            reasoning_effort: env::var("REASONING_EFFORT").unwrap_or(defaults.reasoning_effort),
            timeout_seconds: env_or("COMPLETION_TIMEOUT_SECS", defaults.timeout_seconds)?,
        })
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://openrouter.ai/api/v1".to_string(),
            preferred_models: parse_list(DEFAULT_PREFERRED_MODELS),
            reasoning_effort: "medium".to_string(),
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub system_prompt: String,
    /// New conversations are titled with this many leading characters of the first message.
    pub title_max_chars: usize,
}

impl ChatConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();
        Ok(Self {
            system_prompt: env_opt("SYSTEM_PROMPT").unwrap_or(defaults.system_prompt),
            title_max_chars: env_or("CHAT_TITLE_MAX_CHARS", defaults.title_max_chars)?,
        })
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            title_max_chars: 60,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared secret expected in the `x-admin-token` header.
    pub token: Option<String>,
}

impl AdminConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            token: env_opt("ADMIN_TOKEN"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_preserves_order_and_drops_blanks() {
        let models = parse_list(" a/one , ,b/two,, c/three ");
        assert_eq!(models, vec!["a/one", "b/two", "c/three"]);
    }

    #[test]
    fn test_parse_list_empty() {
        assert!(parse_list("").is_empty());
        assert!(parse_list(" , ").is_empty());
    }

    #[test]
    fn test_completion_defaults() {
        let config = CompletionConfig::default();
        assert_eq!(
            config.preferred_models,
            vec!["deepseek/deepseek-chat", "meta-llama/llama-3.1-70b-instruct"]
        );
        assert_eq!(config.reasoning_effort, "medium");
        assert_eq!(config.base_url, "https://openrouter.ai/api/v1");
    }

    #[test]
    fn test_search_defaults() {
        let config = SearchConfig::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.max_results, 6);
        assert_eq!(config.daily_credit_limit, 200);
        assert_eq!(config.page_fetch_timeout_secs, 15);
        assert_eq!(config.page_max_chars, 2000);
    }

    #[test]
    fn test_connection_url() {
        let config = DatabaseConfig {
            host: "db".to_string(),
            port: 5433,
            database: "chat".to_string(),
            username: "u".to_string(),
            password: "p".to_string(),
            max_connections: 2,
        };
        assert_eq!(config.connection_url(), "postgres://u:p@db:5433/chat");
    }
}
