use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Defines the supported OpenAI-compatible completion providers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provider {
    Mistral,
    OpenAI,
}

impl Provider {
    pub fn default_api_base(&self) -> &'static str {
        match self {
            Provider::Mistral => "https://api.mistral.ai/v1",
            Provider::OpenAI => "https://api.openai.com/v1",
        }
    }

    fn default_chat_model(&self) -> &'static str {
        match self {
            Provider::Mistral => "mistral-medium",
            Provider::OpenAI => "gpt-4o",
        }
    }

    fn default_classifier_model(&self) -> &'static str {
        match self {
            Provider::Mistral => "mistral-tiny",
            Provider::OpenAI => "gpt-4o-mini",
        }
    }

    fn api_key_var(&self) -> &'static str {
        match self {
            Provider::Mistral => "MISTRAL_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub provider: Provider,
    pub api_key: String,
    pub api_base: String,
    pub chat_model: String,
    pub classifier_model: String,
    pub provider_timeout: Duration,
    /// Non-system turns sent as in-scope context; `0` sends everything.
    pub max_context_turns: usize,
    pub log_level: Level,
    pub prompts_path: PathBuf,
    /// Whether `PROMPTS_PATH` was set explicitly.
    pub prompts_path_required: bool,
    pub users_file: PathBuf,
    pub courses_root: PathBuf,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address = parse_var::<SocketAddr>("BIND_ADDRESS", "0.0.0.0:3000")?;

        let provider_str = std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "mistral".to_string());
        let provider = match provider_str.to_lowercase().as_str() {
            "mistral" => Provider::Mistral,
            "openai" => Provider::OpenAI,
            other => {
                return Err(ConfigError::InvalidValue(
                    "LLM_PROVIDER".to_string(),
                    format!("'{}' is not a supported provider", other),
                ));
            }
        };

        let api_key = std::env::var(provider.api_key_var()).map_err(|_| {
            ConfigError::MissingVar(format!(
                "{} must be set for '{}' provider",
                provider.api_key_var(),
                provider_str.to_lowercase()
            ))
        })?;

        let api_base = std::env::var("LLM_API_BASE")
            .unwrap_or_else(|_| provider.default_api_base().to_string());
        let chat_model = std::env::var("CHAT_MODEL")
            .unwrap_or_else(|_| provider.default_chat_model().to_string());
        let classifier_model = std::env::var("CLASSIFIER_MODEL")
            .unwrap_or_else(|_| provider.default_classifier_model().to_string());

        let timeout_secs = parse_var::<u64>("PROVIDER_TIMEOUT_SECS", "30")?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "PROVIDER_TIMEOUT_SECS".to_string(),
                "timeout must be at least one second".to_string(),
            ));
        }
        let max_context_turns = parse_var::<usize>("MAX_CONTEXT_TURNS", "40")?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let (prompts_path, prompts_path_required) = match std::env::var("PROMPTS_PATH") {
            Ok(path) => (PathBuf::from(path), true),
            Err(_) => (PathBuf::from("./prompts"), false),
        };

        let users_file = std::env::var("USERS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("users.json"));
        let courses_root = std::env::var("COURSES_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        Ok(Self {
            bind_address,
            provider,
            api_key,
            api_base,
            chat_model,
            classifier_model,
            provider_timeout: Duration::from_secs(timeout_secs),
            max_context_turns,
            log_level,
            prompts_path,
            prompts_path_required,
            users_file,
            courses_root,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tracing::Level;

    fn clear_env_vars() {
        unsafe {
            for var in [
                "BIND_ADDRESS",
                "LLM_PROVIDER",
                "MISTRAL_API_KEY",
                "OPENAI_API_KEY",
                "LLM_API_BASE",
                "CHAT_MODEL",
                "CLASSIFIER_MODEL",
                "PROVIDER_TIMEOUT_SECS",
                "MAX_CONTEXT_TURNS",
                "RUST_LOG",
                "PROMPTS_PATH",
                "USERS_FILE",
                "COURSES_ROOT",
            ] {
                env::remove_var(var);
            }
        }
    }

    #[test]
    fn test_config_error_display() {
        let missing_var = ConfigError::MissingVar("TEST_VAR".to_string());
        assert_eq!(
            format!("{}", missing_var),
            "Missing environment variable: TEST_VAR"
        );

        let invalid_value =
            ConfigError::InvalidValue("TEST_VAR".to_string(), "bad_value".to_string());
        assert_eq!(
            format!("{}", invalid_value),
            "Invalid value for environment variable TEST_VAR: bad_value"
        );
    }

    #[test]
    #[serial]
    fn test_config_from_env_minimal_mistral() {
        clear_env_vars();
        unsafe {
            env::set_var("MISTRAL_API_KEY", "test-mistral-key");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "0.0.0.0:3000");
        assert_eq!(config.provider, Provider::Mistral);
        assert_eq!(config.api_key, "test-mistral-key");
        assert_eq!(config.api_base, "https://api.mistral.ai/v1");
        assert_eq!(config.chat_model, "mistral-medium");
        assert_eq!(config.classifier_model, "mistral-tiny");
        assert_eq!(config.provider_timeout, Duration::from_secs(30));
        assert_eq!(config.max_context_turns, 40);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.prompts_path, PathBuf::from("./prompts"));
        assert!(!config.prompts_path_required);
        assert_eq!(config.users_file, PathBuf::from("users.json"));
        assert_eq!(config.courses_root, PathBuf::from("."));
    }

    #[test]
    #[serial]
    fn test_config_from_env_openai_provider() {
        clear_env_vars();
        unsafe {
            env::set_var("LLM_PROVIDER", "OpenAI");
            env::set_var("OPENAI_API_KEY", "test-openai-key");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.provider, Provider::OpenAI);
        assert_eq!(config.api_key, "test-openai-key");
        assert_eq!(config.api_base, "https://api.openai.com/v1");
        assert_eq!(config.chat_model, "gpt-4o");
    }

    #[test]
    #[serial]
    fn test_config_from_env_custom_values() {
        clear_env_vars();
        unsafe {
            env::set_var("BIND_ADDRESS", "127.0.0.1:8080");
            env::set_var("MISTRAL_API_KEY", "custom-key");
            env::set_var("LLM_API_BASE", "http://localhost:9000/v1");
            env::set_var("CHAT_MODEL", "mistral-large-latest");
            env::set_var("CLASSIFIER_MODEL", "mistral-small-latest");
            env::set_var("PROVIDER_TIMEOUT_SECS", "5");
            env::set_var("MAX_CONTEXT_TURNS", "0");
            env::set_var("RUST_LOG", "debug");
            env::set_var("PROMPTS_PATH", "/custom/prompts");
            env::set_var("USERS_FILE", "/data/users.json");
            env::set_var("COURSES_ROOT", "/data/courses");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "127.0.0.1:8080");
        assert_eq!(config.api_base, "http://localhost:9000/v1");
        assert_eq!(config.chat_model, "mistral-large-latest");
        assert_eq!(config.classifier_model, "mistral-small-latest");
        assert_eq!(config.provider_timeout, Duration::from_secs(5));
        assert_eq!(config.max_context_turns, 0);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.prompts_path, PathBuf::from("/custom/prompts"));
        assert!(config.prompts_path_required);
        assert_eq!(config.users_file, PathBuf::from("/data/users.json"));
        assert_eq!(config.courses_root, PathBuf::from("/data/courses"));
    }

    #[test]
    #[serial]
    fn test_config_invalid_bind_address() {
        clear_env_vars();
        unsafe {
            env::set_var("BIND_ADDRESS", "not-a-valid-address");
            env::set_var("MISTRAL_API_KEY", "key");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "BIND_ADDRESS"),
            _ => panic!("Expected InvalidValue for BIND_ADDRESS"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_log_level() {
        clear_env_vars();
        unsafe {
            env::set_var("MISTRAL_API_KEY", "key");
            env::set_var("RUST_LOG", "not-a-level");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "RUST_LOG"),
            _ => panic!("Expected InvalidValue for RUST_LOG"),
        }
    }

    #[test]
    #[serial]
    fn test_config_zero_timeout_rejected() {
        clear_env_vars();
        unsafe {
            env::set_var("MISTRAL_API_KEY", "key");
            env::set_var("PROVIDER_TIMEOUT_SECS", "0");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "PROVIDER_TIMEOUT_SECS"),
            _ => panic!("Expected InvalidValue for PROVIDER_TIMEOUT_SECS"),
        }
    }

    #[test]
    #[serial]
    fn test_config_unknown_provider() {
        clear_env_vars();
        unsafe {
            env::set_var("LLM_PROVIDER", "gemini");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "LLM_PROVIDER"),
            _ => panic!("Expected InvalidValue for LLM_PROVIDER"),
        }
    }

    #[test]
    #[serial]
    fn test_config_missing_mistral_key() {
        clear_env_vars();

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(msg) => assert!(msg.contains("MISTRAL_API_KEY")),
            _ => panic!("Expected MissingVar for MISTRAL_API_KEY"),
        }
    }

    #[test]
    #[serial]
    fn test_config_missing_openai_key() {
        clear_env_vars();
        unsafe {
            env::set_var("LLM_PROVIDER", "openai");
            env::set_var("MISTRAL_API_KEY", "unused");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(msg) => assert!(msg.contains("OPENAI_API_KEY")),
            _ => panic!("Expected MissingVar for OPENAI_API_KEY"),
        }
    }
}
