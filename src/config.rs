//! # Bot Configuration Module
//!
//! Reads the runtime configuration from environment variables (optionally
//! loaded from a `.env` file by the binary).

use std::collections::HashMap;
use std::path::PathBuf;
use teloxide::types::UserId;

pub const DEFAULT_SURVEY_CONFIG: &str = "survey.json";
pub const DEFAULT_MEDIA_DIR: &str = "media_files";
pub const DEFAULT_ANSWER_LOG: &str = "user_answers.log";
pub const DEFAULT_LANGUAGE: &str = "en";

/// Errors raised while reading the configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required variable is not set
    Missing(String),
    /// A variable is set but cannot be parsed
    Invalid { key: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{key} must be set"),
            ConfigError::Invalid { key, message } => write!(f, "Invalid value for {key}: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Output format of the operator log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Runtime configuration of the bot
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    /// The single user allowed to run `/get_media` and `/get_logs`
    pub admin_id: UserId,
    pub survey_config_path: PathBuf,
    pub media_dir: PathBuf,
    pub answer_log_path: PathBuf,
    pub language: String,
    pub database_url: Option<String>,
    /// Write completed surveys to the responses table
    pub persist_responses: bool,
    pub log_format: LogFormat,
}

impl BotConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Read the configuration from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let required = |key: &str| get(key).ok_or_else(|| ConfigError::Missing(key.to_string()));

        let bot_token = required("TELEGRAM_BOT_TOKEN")?;

        let admin_raw = required("ADMIN_ID")?;
        let admin_id = admin_raw
            .parse::<u64>()
            .map(UserId)
            .map_err(|e| ConfigError::Invalid {
                key: "ADMIN_ID".to_string(),
                message: e.to_string(),
            })?;

        let persist_responses = match get("PERSIST_RESPONSES") {
            None => false,
            Some(value) => parse_bool(&value).ok_or_else(|| ConfigError::Invalid {
                key: "PERSIST_RESPONSES".to_string(),
                message: format!("expected true or false, got '{value}'"),
            })?,
        };

        let log_format = match get("LOG_FORMAT").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT".to_string(),
                    message: format!("expected text or json, got '{other}'"),
                })
            }
        };

        Ok(Self {
            bot_token,
            admin_id,
            survey_config_path: get("SURVEY_CONFIG")
                .unwrap_or_else(|| DEFAULT_SURVEY_CONFIG.to_string())
                .into(),
            media_dir: get("MEDIA_DIR")
                .unwrap_or_else(|| DEFAULT_MEDIA_DIR.to_string())
                .into(),
            answer_log_path: get("ANSWER_LOG_PATH")
                .unwrap_or_else(|| DEFAULT_ANSWER_LOG.to_string())
                .into(),
            language: get("BOT_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            database_url: get("DATABASE_URL"),
            persist_responses,
            log_format,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_apply() {
        let config =
            BotConfig::from_vars(&vars(&[("TELEGRAM_BOT_TOKEN", "123:abc"), ("ADMIN_ID", "42")]))
                .unwrap();
        assert_eq!(config.admin_id, UserId(42));
        assert_eq!(config.media_dir, PathBuf::from("media_files"));
        assert_eq!(config.answer_log_path, PathBuf::from("user_answers.log"));
        assert_eq!(config.survey_config_path, PathBuf::from("survey.json"));
        assert_eq!(config.language, "en");
        assert_eq!(config.database_url, None);
        assert!(!config.persist_responses);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_missing_token() {
        let err = BotConfig::from_vars(&vars(&[("ADMIN_ID", "42")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("TELEGRAM_BOT_TOKEN".to_string()));
        assert_eq!(err.to_string(), "TELEGRAM_BOT_TOKEN must be set");
    }

    #[test]
    fn test_non_numeric_admin_id() {
        let err = BotConfig::from_vars(&vars(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("ADMIN_ID", "@admin"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "ADMIN_ID"));
    }

    #[test]
    fn test_overrides() {
        let config = BotConfig::from_vars(&vars(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("ADMIN_ID", "7"),
            ("MEDIA_DIR", "/srv/media"),
            ("BOT_LANGUAGE", "ru"),
            ("DATABASE_URL", "sqlite://responses.db"),
            ("PERSIST_RESPONSES", "yes"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();
        assert_eq!(config.media_dir, PathBuf::from("/srv/media"));
        assert_eq!(config.language, "ru");
        assert_eq!(config.database_url.as_deref(), Some("sqlite://responses.db"));
        assert!(config.persist_responses);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_bool() {
        let err = BotConfig::from_vars(&vars(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("ADMIN_ID", "1"),
            ("PERSIST_RESPONSES", "maybe"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "PERSIST_RESPONSES"));
    }
}
