use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::{PortalClient, RetryConfig};
use crate::draft::UploadPolicy;
use crate::wizard::{BusinessRules, Lookups};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiSettings,
    pub uploads: UploadSettings,
    pub rules: RuleSettings,
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    /// Environment variable holding the bearer token
    pub token_env: String,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            token_env: "PERMIT_PORTAL_TOKEN".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub max_file_size: usize,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        let policy = UploadPolicy::default();
        Self {
            max_file_size: policy.max_file_size,
            allowed_extensions: policy.allowed_extensions,
            allowed_content_types: policy.allowed_content_types,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSettings {
    pub phone_pattern: Option<String>,
    pub lookups: Lookups,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("permit-wizard")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".permit-wizard")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location; a missing file yields the defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", config_path);

        if !config_path.exists() {
            info!("Config file doesn't exist, using defaults");
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        debug!("Loaded config for portal {}", config.api.base_url);
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(dir) = config_path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create config directory: {:?}", dir))?;
                info!("Created config directory: {:?}", dir);
            }
        }

        let config_content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(config_path, config_content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        info!("Config saved to {:?}", config_path);
        Ok(())
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::new(
            self.uploads.max_file_size,
            self.uploads.allowed_extensions.clone(),
            self.uploads.allowed_content_types.clone(),
        )
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.retry.max_attempts,
            base_delay: Duration::from_millis(self.retry.base_delay_ms),
            max_delay: Duration::from_millis(self.retry.max_delay_ms),
            ..RetryConfig::default()
        }
    }

    pub fn business_rules(&self, today: NaiveDate) -> Result<BusinessRules> {
        let mut rules = BusinessRules::new(today).with_lookups(self.rules.lookups.clone());
        if let Some(pattern) = &self.rules.phone_pattern {
            let regex = Regex::new(pattern).with_context(|| format!("Invalid phone_pattern: {}", pattern))?;
            rules = rules.with_phone_pattern(regex);
        }
        Ok(rules)
    }

    /// Bearer token from the configured environment variable, if set
    pub fn access_token(&self) -> Option<String> {
        std::env::var(&self.api.token_env).ok().filter(|t| !t.trim().is_empty())
    }

    pub fn portal_client(&self) -> Result<PortalClient> {
        let token = self.access_token();
        if token.is_none() {
            info!("{} is not set; calling the portal without a bearer token", self.api.token_env);
        }
        PortalClient::new(
            self.api.base_url.clone(),
            token,
            Duration::from_secs(self.api.timeout_secs),
            self.retry_config(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.upload_policy(), UploadPolicy::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[api]
base_url = "https://portal.example.gov/api"

[rules]
phone_pattern = '^05\d{8}$'

[rules.lookups]
event_types = [1, 2]
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api.base_url, "https://portal.example.gov/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.retry.max_attempts, 3);

        let rules = config
            .business_rules(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
            .unwrap();
        assert!(rules.phone_is_valid("0501234567"));
        assert!(!rules.phone_is_valid("12345"));
        assert!(rules.lookups.event_types.contains(&2));
    }

    #[test]
    fn test_save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.retry.max_attempts = 5;

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_phone_pattern_is_reported() {
        let mut config = Config::default();
        config.rules.phone_pattern = Some("([".to_string());
        let err = config
            .business_rules(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("Invalid phone_pattern"));
    }
}
