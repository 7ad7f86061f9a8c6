use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use crate::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};

/// Settings exposed to the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub model: String,
    pub endpoint: String,
    pub request_timeout_secs: u64,
}

impl Settings {
    /// Validate before saving
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.model.trim().is_empty() {
            errors.push("model must not be empty".to_string());
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            errors.push("endpoint must be an http(s) URL".to_string());
        }
        if self.request_timeout_secs == 0 {
            errors.push("request timeout must be at least 1 second".to_string());
        }
        errors
    }
}

/// Internal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub schema_version: u32,
    pub model: String,
    pub endpoint: String,
    /// Remote call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: 1,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Get the default config directory
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".characterstudio"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from file or return default
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                debug!("Failed to load config, using default: {}", e);
                Self::default()
            }
        }
    }

    /// Load config from file
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Convert to frontend Settings
    pub fn to_settings(&self) -> Settings {
        Settings {
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
            request_timeout_secs: self.request_timeout_secs,
        }
    }

    /// Update from frontend Settings
    pub fn update_from_settings(&mut self, settings: &Settings) {
        self.model = settings.model.clone();
        self.endpoint = settings.endpoint.clone();
        self.request_timeout_secs = settings.request_timeout_secs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.schema_version, 1);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_missing_timeout_field_gets_default() {
        // Config files written before the timeout knob existed
        let raw = r#"{"schema_version":1,"model":"gemini-2.0-flash","endpoint":"https://example.com"}"#;
        let config: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_settings_roundtrip() {
        let config = Config::default();
        let settings = config.to_settings();

        let mut config2 = Config::default();
        config2.update_from_settings(&settings);

        assert_eq!(config.model, config2.model);
        assert_eq!(config.endpoint, config2.endpoint);
        assert_eq!(config.request_timeout_secs, config2.request_timeout_secs);
    }

    #[test]
    fn test_settings_validation() {
        let valid = Settings {
            model: "gemini-2.0-flash".to_string(),
            endpoint: "https://example.com/v1beta/models".to_string(),
            request_timeout_secs: 60,
        };
        assert!(valid.validate().is_empty());

        let bad_model = Settings {
            model: "  ".to_string(),
            endpoint: "https://example.com".to_string(),
            request_timeout_secs: 60,
        };
        assert_eq!(bad_model.validate().len(), 1);

        let bad_endpoint = Settings {
            model: "gemini-2.0-flash".to_string(),
            endpoint: "ftp://example.com".to_string(),
            request_timeout_secs: 60,
        };
        assert_eq!(bad_endpoint.validate().len(), 1);

        let bad_timeout = Settings {
            model: "gemini-2.0-flash".to_string(),
            endpoint: "https://example.com".to_string(),
            request_timeout_secs: 0,
        };
        assert_eq!(bad_timeout.validate().len(), 1);
    }

    #[test]
    fn test_config_dir() {
        let result = Config::config_dir();
        assert!(result.is_ok());
        assert!(result
            .unwrap()
            .to_string_lossy()
            .contains(".characterstudio"));
    }

    #[test]
    fn test_config_path() {
        let result = Config::config_path();
        assert!(result.is_ok());
        assert!(result.unwrap().to_string_lossy().ends_with("config.json"));
    }
}
