use crate::utils::error::{Result, RvcError};
use crate::utils::validation::{validate_currency_code, validate_path, validate_positive_number, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional `--config` file. Every section and key may be left out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub currency: Option<String>,
}

impl ClientConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RvcError::Config {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RvcError::Config {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.server.base_url {
            validate_url("server.base_url", url)?;
        }
        if let Some(timeout) = self.server.timeout_seconds {
            validate_positive_number("server.timeout_seconds", timeout, 1)?;
        }
        if let Some(path) = &self.state.path {
            validate_path("state.path", path)?;
        }
        if let Some(currency) = &self.display.currency {
            validate_currency_code("display.currency", currency)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
base_url = "https://rvc.example.com"
timeout_seconds = 10

[state]
path = "/tmp/rvc-state.json"

[display]
currency = "EUR"
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.server.base_url.as_deref(), Some("https://rvc.example.com"));
        assert_eq!(config.server.timeout_seconds, Some(10));
        assert_eq!(config.state.path.as_deref(), Some("/tmp/rvc-state.json"));
        assert_eq!(config.display.currency.as_deref(), Some("EUR"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sections_are_optional() {
        let config = ClientConfig::from_toml_str("[display]\ncurrency = \"GBP\"\n").unwrap();
        assert!(config.server.base_url.is_none());
        assert!(config.state.path.is_none());

        let empty = ClientConfig::from_toml_str("").unwrap();
        assert!(empty.display.currency.is_none());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("RVC_TEST_BASE_URL", "https://env.example.com");

        let toml_content = r#"
[server]
base_url = "${RVC_TEST_BASE_URL}"
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.server.base_url.as_deref(), Some("https://env.example.com"));

        std::env::remove_var("RVC_TEST_BASE_URL");
    }

    #[test]
    fn test_config_validation() {
        let bad_url = ClientConfig::from_toml_str("[server]\nbase_url = \"invalid-url\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let bad_timeout = ClientConfig::from_toml_str("[server]\ntimeout_seconds = 0\n").unwrap();
        assert!(bad_timeout.validate().is_err());

        let bad_currency = ClientConfig::from_toml_str("[display]\ncurrency = \"EURO\"\n").unwrap();
        assert!(matches!(
            bad_currency.validate(),
            Err(RvcError::InvalidConfigValue { .. })
        ));
    }

    #[test]
    fn test_malformed_toml_is_a_config_error() {
        let err = ClientConfig::from_toml_str("[server\nbase_url = 1").unwrap_err();
        assert!(matches!(err, RvcError::Config { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nbase_url = \"http://localhost:8080\"\n")
            .unwrap();

        let config = ClientConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.server.base_url.as_deref(), Some("http://localhost:8080"));
    }
}
