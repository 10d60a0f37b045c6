use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Hard ceiling on invoke-and-parse cycles per analysis.
pub const MAX_ATTEMPT_CEILING: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_model() -> String {
    "gpt-4o".into()
}

fn default_temperature() -> f64 {
    0.25
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_body_zone")]
    pub default_body_zone: String,
    #[serde(default)]
    pub save_images: bool,
    #[serde(default = "default_images_dir")]
    pub images_dir: String,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_body_zone() -> String {
    crate::analysis::DEFAULT_BODY_ZONE.into()
}

fn default_images_dir() -> String {
    "~/.skinsight/saved_images".into()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            default_body_zone: default_body_zone(),
            save_images: false,
            images_dir: default_images_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_users_dir")]
    pub users_dir: String,
    #[serde(default = "default_records_file")]
    pub records_file: String,
}

fn default_data_dir() -> String {
    "~/.skinsight/user_data".into()
}

fn default_users_dir() -> String {
    "~/.skinsight/users".into()
}

fn default_records_file() -> String {
    "anagrafiche.json".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            users_dir: default_users_dir(),
            records_file: default_records_file(),
        }
    }
}

impl StorageConfig {
    pub fn data_path(&self) -> PathBuf {
        expand_path(&self.data_dir)
    }

    pub fn users_path(&self) -> PathBuf {
        expand_path(&self.users_dir)
    }
}

impl AnalysisConfig {
    pub fn images_path(&self) -> PathBuf {
        expand_path(&self.images_dir)
    }
}

/// Expand `~` in configured directories.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());

        Self {
            config_path: home.join(".skinsight").join("config.toml"),
            provider: ProviderConfig::default(),
            analysis: AnalysisConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let provider = &self.provider;
        if provider.temperature.is_nan() || !(0.0..=2.0).contains(&provider.temperature) {
            return Err(ConfigError::Validation(
                "provider.temperature must be in [0.0, 2.0]".into(),
            ));
        }
        if provider.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "provider.max_tokens must be >= 1".into(),
            ));
        }
        if provider.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "provider.request_timeout_secs must be >= 1".into(),
            ));
        }
        if provider.model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "provider.model must not be empty".into(),
            ));
        }
        url::Url::parse(&provider.base_url).map_err(|e| {
            ConfigError::Validation(format!("provider.base_url is not a valid URL: {e}"))
        })?;

        let attempts = self.analysis.max_attempts;
        if !(1..=MAX_ATTEMPT_CEILING).contains(&attempts) {
            return Err(ConfigError::Validation(format!(
                "analysis.max_attempts must be in [1, {MAX_ATTEMPT_CEILING}], got {attempts}"
            )));
        }
        Ok(())
    }
}
