use std::env;
use std::str::FromStr;

use crate::error::AppError;
use crate::settings::{SettingName, Settings};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub service: ServiceConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
    /// Live settings a new session starts with.
    pub settings: Settings,
    /// Setting overrides that were ignored, for logging once tracing is up.
    pub rejected_overrides: Vec<RejectedOverride>,
}

/// A `RULEBOT_*` setting override that failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedOverride {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Question-answering service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub access_token: String,
    /// Header the access token is sent in.
    pub access_token_header: String,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
}

/// Environment variable overriding each default setting.
const SETTING_ENV_VARS: [(SettingName, &str); 11] = [
    (SettingName::Model, "RULEBOT_MODEL"),
    (SettingName::EmbedderModel, "RULEBOT_EMBEDDER_MODEL"),
    (SettingName::EmbeddingDim, "RULEBOT_EMBEDDING_DIM"),
    (SettingName::TopKChunks, "RULEBOT_TOP_K_CHUNKS"),
    (SettingName::TopKRules, "RULEBOT_TOP_K_RULES"),
    (SettingName::TopKSituations, "RULEBOT_TOP_K_SITUATIONS"),
    (SettingName::Threshold, "RULEBOT_THRESHOLD"),
    (SettingName::SituationThreshold, "RULEBOT_SITUATION_THRESHOLD"),
    (SettingName::Temperature, "RULEBOT_TEMPERATURE"),
    (SettingName::MaxLength, "RULEBOT_MAX_LENGTH"),
    (SettingName::Debug, "RULEBOT_DEBUG"),
];

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let service = ServiceConfig {
            base_url: env::var("RULEBOT_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string())
                .trim_end_matches('/')
                .to_string(),
            access_token: env::var("RULEBOT_ACCESS_TOKEN").map_err(|_| AppError::Config {
                message: "RULEBOT_ACCESS_TOKEN is required".to_string(),
            })?,
            access_token_header: env::var("RULEBOT_ACCESS_TOKEN_HEADER")
                .unwrap_or_else(|_| "access_token".to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: parse_env("REQUEST_TIMEOUT_MS").unwrap_or(120_000),
        };

        let mut settings = Settings::default();
        let mut rejected_overrides = Vec::new();
        for (name, var) in SETTING_ENV_VARS {
            if let Ok(value) = env::var(var) {
                if let Err(e) = settings.update(name, &value) {
                    rejected_overrides.push(RejectedOverride {
                        var,
                        value,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(Config {
            service,
            logging,
            request,
            settings,
            rejected_overrides,
        })
    }
}

fn parse_env<T: FromStr>(var: &str) -> Option<T> {
    env::var(var).ok().and_then(|s| s.parse().ok())
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 120_000,
        }
    }
}
