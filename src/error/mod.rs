use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Errors from the outbound call to the question-answering service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("API error: {status} - {detail}")]
    Api { status: u16, detail: String },

    #[error("API request failed with status {status}")]
    RequestFailed { status: u16 },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request abandoned before the service answered")]
    Abandoned,
}

impl ServiceError {
    /// Human-readable detail shown in the assistant's error turn.
    ///
    /// The service-supplied `detail` is used verbatim when one was parsed;
    /// every other failure kind falls back to its own description.
    pub fn detail(&self) -> String {
        match self {
            ServiceError::Api { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status returned by the service, if the call got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Api { status, .. } | ServiceError::RequestFailed { status } => {
                Some(*status)
            }
            ServiceError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Errors raised when a live setting update is rejected
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("Unknown setting: {name}")]
    UnknownSetting { name: String },

    #[error("Invalid value for {name}: {value} ({reason})")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Value for {name} out of range: {value} (allowed {min}..={max})")]
    OutOfRange {
        name: String,
        value: String,
        min: String,
        max: String,
    },
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for service calls
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type alias for settings updates
pub type SettingsResult<T> = Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config {
            message: "missing key".to_string(),
        };
        assert_eq!(err.to_string(), "Configuration error: missing key");

        let err: AppError = ServiceError::RequestFailed { status: 502 }.into();
        assert_eq!(
            err.to_string(),
            "Service error: API request failed with status 502"
        );
    }

    #[test]
    fn test_service_error_display() {
        let err = ServiceError::Api {
            status: 500,
            detail: "index not loaded".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 500 - index not loaded");

        let err = ServiceError::RequestFailed { status: 502 };
        assert_eq!(err.to_string(), "API request failed with status 502");

        let err = ServiceError::InvalidResponse {
            message: "missing field `answer`".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid response: missing field `answer`");

        let err = ServiceError::Timeout { timeout_ms: 5000 };
        assert_eq!(err.to_string(), "Request timeout after 5000ms");

        assert_eq!(
            ServiceError::Abandoned.to_string(),
            "Request abandoned before the service answered"
        );
    }

    #[test]
    fn test_service_error_detail_prefers_service_message() {
        let err = ServiceError::Api {
            status: 403,
            detail: "Could not validate credentials".to_string(),
        };
        assert_eq!(err.detail(), "Could not validate credentials");
    }

    #[test]
    fn test_service_error_detail_falls_back_to_description() {
        let err = ServiceError::RequestFailed { status: 500 };
        assert_eq!(err.detail(), "API request failed with status 500");

        let err = ServiceError::Timeout { timeout_ms: 100 };
        assert_eq!(err.detail(), "Request timeout after 100ms");
    }

    #[test]
    fn test_service_error_status() {
        assert_eq!(
            ServiceError::Api {
                status: 401,
                detail: "nope".to_string()
            }
            .status(),
            Some(401)
        );
        assert_eq!(ServiceError::RequestFailed { status: 503 }.status(), Some(503));
        assert_eq!(ServiceError::Timeout { timeout_ms: 1 }.status(), None);
    }

    #[test]
    fn test_settings_error_display() {
        let err = SettingsError::UnknownSetting {
            name: "font_size".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown setting: font_size");

        let err = SettingsError::OutOfRange {
            name: "top_k_rules".to_string(),
            value: "0".to_string(),
            min: "1".to_string(),
            max: "100".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Value for top_k_rules out of range: 0 (allowed 1..=100)"
        );
    }

    #[test]
    fn test_service_error_conversion_to_app_error() {
        let err: AppError = ServiceError::Timeout { timeout_ms: 1000 }.into();
        assert!(matches!(err, AppError::Service(_)));
    }

    #[test]
    fn test_settings_error_conversion_to_app_error() {
        let err: AppError = SettingsError::UnknownSetting {
            name: "x".to_string(),
        }
        .into();
        assert!(matches!(err, AppError::Settings(_)));
        assert!(err.to_string().contains("Unknown setting"));
    }
}
