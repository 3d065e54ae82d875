#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use toml_config::ClientConfig;

use crate::utils::error::Result;
use crate::utils::validation::{validate_currency_code, validate_positive_number, validate_url, Validate};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const STATE_FILE_NAME: &str = ".rvc_state.json";

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsOverrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub state_file: Option<PathBuf>,
    pub currency: Option<String>,
}

/// Effective client settings: command line, then config file, then defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub timeout: Duration,
    pub state_file: PathBuf,
    pub currency: Option<String>,
}

fn default_state_file() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(STATE_FILE_NAME)
}

impl Settings {
    pub fn resolve(overrides: &SettingsOverrides, file: Option<&ClientConfig>) -> Self {
        let server = file.map(|f| &f.server);
        let base_url = overrides
            .base_url
            .clone()
            .or_else(|| server.and_then(|s| s.base_url.clone()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = overrides
            .timeout_secs
            .or_else(|| server.and_then(|s| s.timeout_seconds))
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let state_file = overrides
            .state_file
            .clone()
            .or_else(|| file.and_then(|f| f.state.path.as_ref().map(PathBuf::from)))
            .unwrap_or_else(default_state_file);
        let currency = overrides
            .currency
            .clone()
            .or_else(|| file.and_then(|f| f.display.currency.clone()))
            .map(|c| c.trim().to_uppercase());

        Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            state_file,
            currency,
        }
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        validate_positive_number("timeout_secs", self.timeout.as_secs(), 1)?;
        if let Some(currency) = &self.currency {
            validate_currency_code("currency", currency)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(&SettingsOverrides::default(), None);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert!(settings.state_file.ends_with(STATE_FILE_NAME));
        assert_eq!(settings.currency, None);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_command_line_wins_over_file() {
        let file = ClientConfig::from_toml_str(
            r#"
[server]
base_url = "https://file.example.com"
timeout_seconds = 5

[state]
path = "/tmp/from-file.json"

[display]
currency = "gbp"
"#,
        )
        .unwrap();
        let overrides = SettingsOverrides {
            base_url: Some("http://cli.example.com".to_string()),
            ..SettingsOverrides::default()
        };

        let settings = Settings::resolve(&overrides, Some(&file));
        assert_eq!(settings.base_url, "http://cli.example.com");
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.state_file, PathBuf::from("/tmp/from-file.json"));
        assert_eq!(settings.currency.as_deref(), Some("GBP"));
    }

    #[test]
    fn test_invalid_settings() {
        let overrides = SettingsOverrides {
            timeout_secs: Some(0),
            ..SettingsOverrides::default()
        };
        assert!(Settings::resolve(&overrides, None).validate().is_err());

        let overrides = SettingsOverrides {
            base_url: Some("ftp://example.com".to_string()),
            ..SettingsOverrides::default()
        };
        assert!(Settings::resolve(&overrides, None).validate().is_err());
    }
}
