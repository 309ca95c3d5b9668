use crate::domain::ports::{
    HandlerSettings, SettingsProvider, DEFAULT_EMAIL_ATTRIBUTE, DEFAULT_LIST_ITEM_TAG,
    DEFAULT_MARKER_CLASS, DEFAULT_TRANSPORT_FAILED_MESSAGE, DEFAULT_UNREGISTER_FAILED_MESSAGE,
};
use crate::utils::error::{Result, UnregisterError};
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_token, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandlerConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub handler: DomConfig,
    #[serde(default)]
    pub messages: MessagesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomConfig {
    pub marker_class: Option<String>,
    pub email_attribute: Option<String>,
    pub list_item_tag: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagesConfig {
    pub unregister_failed: Option<String>,
    pub transport_failed: Option<String>,
}

impl HandlerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| UnregisterError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${UNREGISTER_BASE_URL})，找不到的變數視為錯誤
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| UnregisterError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let mut missing = Vec::new();
        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                missing.push(var_name.to_string());
                String::new()
            })
        });

        if let Some(field) = missing.into_iter().next() {
            return Err(UnregisterError::MissingConfigError { field });
        }

        Ok(result.into_owned())
    }
}

impl Validate for HandlerConfig {
    fn validate(&self) -> Result<()> {
        validate_url("server.base_url", &self.server.base_url)?;
        validate_range("server.timeout_seconds", self.timeout_seconds(), 1, 300)?;

        let settings = self.handler_settings();
        validate_token("handler.marker_class", &settings.marker_class)?;
        validate_token("handler.email_attribute", &settings.email_attribute)?;
        validate_token("handler.list_item_tag", &settings.list_item_tag)?;
        validate_non_empty_string(
            "messages.unregister_failed",
            &settings.unregister_failed_message,
        )?;
        validate_non_empty_string(
            "messages.transport_failed",
            &settings.transport_failed_message,
        )?;
        Ok(())
    }
}

impl SettingsProvider for HandlerConfig {
    fn base_url(&self) -> &str {
        &self.server.base_url
    }

    fn timeout_seconds(&self) -> u64 {
        self.server.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn handler_settings(&self) -> HandlerSettings {
        let pick = |value: &Option<String>, default: &str| {
            value.clone().unwrap_or_else(|| default.to_string())
        };

        HandlerSettings {
            marker_class: pick(&self.handler.marker_class, DEFAULT_MARKER_CLASS),
            email_attribute: pick(&self.handler.email_attribute, DEFAULT_EMAIL_ATTRIBUTE),
            list_item_tag: pick(&self.handler.list_item_tag, DEFAULT_LIST_ITEM_TAG),
            unregister_failed_message: pick(
                &self.messages.unregister_failed,
                DEFAULT_UNREGISTER_FAILED_MESSAGE,
            ),
            transport_failed_message: pick(
                &self.messages.transport_failed,
                DEFAULT_TRANSPORT_FAILED_MESSAGE,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = HandlerConfig::from_toml_str("").unwrap();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout_seconds(), DEFAULT_TIMEOUT_SECONDS);
        assert_eq!(config.handler_settings(), HandlerSettings::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_and_env_substitution() {
        std::env::set_var("PU_TEST_BASE_URL", "https://school.example");
        let config = HandlerConfig::from_toml_str(
            r#"
            [server]
            base_url = "${PU_TEST_BASE_URL}"
            timeout_seconds = 3

            [handler]
            marker_class = "remove-participant"

            [messages]
            unregister_failed = "Could not remove participant."
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url(), "https://school.example");
        assert_eq!(config.timeout_seconds(), 3);
        let settings = config.handler_settings();
        assert_eq!(settings.marker_class, "remove-participant");
        assert_eq!(settings.email_attribute, DEFAULT_EMAIL_ATTRIBUTE);
        assert_eq!(settings.unregister_failed_message, "Could not remove participant.");
    }

    #[test]
    fn test_missing_env_var_is_an_error() {
        let err = HandlerConfig::from_toml_str(
            "[server]\nbase_url = \"${PU_TEST_DEFINITELY_UNSET_VAR}\"\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            UnregisterError::MissingConfigError { ref field } if field == "PU_TEST_DEFINITELY_UNSET_VAR"
        ));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = HandlerConfig::default();
        config.server.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = HandlerConfig::default();
        config.server.timeout_seconds = Some(0);
        assert!(config.validate().is_err());

        let mut config = HandlerConfig::default();
        config.handler.marker_class = Some("delete btn".to_string());
        assert!(config.validate().is_err());
    }
}
