use crate::domain::model::LimitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RvcError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{message}")]
    LimitReached {
        message: String,
        limit: Option<LimitStatus>,
    },

    #[error("Malformed server response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error in '{field}': {message}")]
    Config { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{message}")]
    Validation { message: String },

    #[error("Client state error: {message}")]
    State { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Server,
    UsageLimit,
    Input,
    Configuration,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RvcError {
    pub fn validation(message: impl Into<String>) -> Self {
        RvcError::Validation {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            RvcError::Transport(_) => ErrorCategory::Network,
            RvcError::Api { .. } | RvcError::Decode(_) => ErrorCategory::Server,
            RvcError::LimitReached { .. } => ErrorCategory::UsageLimit,
            RvcError::Validation { .. } => ErrorCategory::Input,
            RvcError::Config { .. } | RvcError::InvalidConfigValue { .. } => {
                ErrorCategory::Configuration
            }
            RvcError::Io(_) | RvcError::Csv(_) | RvcError::State { .. } => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RvcError::Validation { .. } | RvcError::LimitReached { .. } => ErrorSeverity::High,
            RvcError::Transport(_) => ErrorSeverity::Medium,
            RvcError::Api { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            RvcError::Api { .. } | RvcError::Decode(_) => ErrorSeverity::High,
            RvcError::State { .. } => ErrorSeverity::Low,
            RvcError::Csv(_) => ErrorSeverity::High,
            RvcError::Config { .. } | RvcError::InvalidConfigValue { .. } | RvcError::Io(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    /// The message shown to the user. Server messages pass through verbatim.
    pub fn user_friendly_message(&self) -> String {
        match self {
            RvcError::Transport(e) if e.is_timeout() => {
                "The server did not answer in time".to_string()
            }
            RvcError::Transport(e) if e.is_connect() => {
                "Could not connect to the analysis server".to_string()
            }
            RvcError::Transport(_) => "The request to the analysis server failed".to_string(),
            RvcError::Decode(_) => "The server sent a response the client could not read".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the server is running and --base-url is correct, then retry",
            ErrorCategory::Server => "Retry the same command; if it keeps failing, clear the cache for the ticker",
            ErrorCategory::UsageLimit => "Wait for the limit to reset or activate a PRO license with `rvc license activate`",
            ErrorCategory::Input => "Fix the input and run the command again",
            ErrorCategory::Configuration => "Review the command-line flags and the --config file",
            ErrorCategory::Storage => "Check permissions on the state file or point --state-file elsewhere",
        }
    }
}

pub type Result<T> = std::result::Result<T, RvcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_is_verbatim() {
        let err = RvcError::Api {
            status: 404,
            message: "No data found for ZZZZ".to_string(),
        };
        assert_eq!(err.user_friendly_message(), "No data found for ZZZZ");
        assert_eq!(err.category(), ErrorCategory::Server);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(RvcError::validation("x").severity(), ErrorSeverity::High);
        let server = RvcError::Api {
            status: 503,
            message: "down".into(),
        };
        assert_eq!(server.severity(), ErrorSeverity::Medium);
        let config = RvcError::Config {
            field: "base_url".into(),
            message: "missing".into(),
        };
        assert_eq!(config.severity(), ErrorSeverity::Critical);
        let state = RvcError::State {
            message: "corrupt".into(),
        };
        assert_eq!(state.severity(), ErrorSeverity::Low);
    }

    #[test]
    fn test_limit_reached_category() {
        let err = RvcError::LimitReached {
            message: "Usage limit reached".into(),
            limit: None,
        };
        assert_eq!(err.category(), ErrorCategory::UsageLimit);
        assert_eq!(err.to_string(), "Usage limit reached");
    }
}
