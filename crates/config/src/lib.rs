// Configuration Management
//
// This crate handles all configuration loading for the chat API:
// - Configuration structs and deserialization
// - File loading logic with an environment fallback
// - Default configuration values
//
// This keeps configuration concerns separate from domain logic.

use std::path::Path;
use thiserror::Error;

pub mod types;

// Re-export all configuration types
pub use types::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {source}")]
    ParseError {
        #[from]
        source: serde_yaml::Error,
    },

    #[error("Invalid environment configuration: {0}")]
    EnvError(String),
}

const CONFIG_PATHS: [&str; 3] = ["config/config.yaml", "config.yaml", "config/default.yaml"];

/// Main configuration loading interface
impl ApiConfig {
    /// Load configuration from YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ApiConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the first YAML file found in the default
    /// locations, or from environment variables when none exists.
    pub fn load() -> Result<Self, ConfigError> {
        for path in &CONFIG_PATHS {
            if Path::new(path).exists() {
                return Self::load_from_file(path);
            }
        }

        Self::from_env().map_err(ConfigError::EnvError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file_applies_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  port: 8080
database:
  host: db.internal
  port: 5432
  database: chat
  username: chat
  password: secret
search:
  api_key: tvly-test
  daily_credit_limit: 3
completion:
  preferred_models: ["model/a", "model/b"]
admin:
  token: admin-secret
"#
        )
        .unwrap();

        let config = ApiConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.search.api_key.as_deref(), Some("tvly-test"));
        assert_eq!(config.search.daily_credit_limit, 3);
        assert_eq!(config.search.max_results, 6);
        assert_eq!(config.completion.preferred_models, vec!["model/a", "model/b"]);
        assert_eq!(config.completion.reasoning_effort, "medium");
        assert_eq!(config.chat.title_max_chars, 60);
        assert_eq!(config.admin.token.as_deref(), Some("admin-secret"));
    }

    #[test]
    fn test_load_from_file_rejects_invalid_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server: [unclosed").unwrap();

        let result = ApiConfig::load_from_file(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = ApiConfig::load_from_file("/nonexistent/config.yaml");
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }
}
