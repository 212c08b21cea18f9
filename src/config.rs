use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{PlatformError, Result};
use crate::models::Language;

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub onboarding: OnboardingConfig,
    pub upload: UploadConfig,
    pub database: DatabaseSessionConfig,
    pub chat: ChatConfig,
    pub reviews: ReviewsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
    /// Console log format, "json" or "text"; the file log is always JSON
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OnboardingConfig {
    pub tick_interval_ms: u64,
    pub progress_step: u8,
    pub settle_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadConfig {
    pub max_file_size_bytes: u64,
    pub progress_step: u8,
    pub step_delay_ms: u64,
    pub processing_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseSessionConfig {
    pub connect_delay_ms: u64,
    pub success_probability: f64,
    pub history_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatConfig {
    pub reply_delay_ms: u64,
    pub default_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewsConfig {
    pub seed_reviews: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            onboarding: OnboardingConfig {
                tick_interval_ms: 50,
                progress_step: 2,
                settle_delay_ms: 500,
            },
            upload: UploadConfig {
                max_file_size_bytes: 10 * 1024 * 1024,
                progress_step: 10,
                step_delay_ms: 100,
                processing_delay_ms: 2000,
            },
            database: DatabaseSessionConfig {
                connect_delay_ms: 2000,
                success_probability: 0.7,
                history_limit: 5,
            },
            chat: ChatConfig {
                reply_delay_ms: 1500,
                default_language: "fr".to_string(),
            },
            reviews: ReviewsConfig { seed_reviews: true },
        }
    }
}

impl AppConfig {
    /// Load configuration, layering an explicit file over the default locations
    pub fn load_with(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            // Start with default values
            .add_source(Config::try_from(&AppConfig::default())?)
            // Add config files if they exist
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            // Add environment variables with prefix
            .add_source(
                Environment::with_prefix("PLATEFORME_IA")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;

        // Validate configuration
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level, valid_levels
            )));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(invalid(format!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format, valid_formats
            )));
        }

        // Validate onboarding config
        if self.onboarding.tick_interval_ms == 0 {
            return Err(invalid("onboarding.tick_interval_ms must be greater than 0"));
        }
        if self.onboarding.progress_step == 0 || self.onboarding.progress_step > 100 {
            return Err(invalid("onboarding.progress_step must be between 1 and 100"));
        }

        // Validate upload config
        if self.upload.max_file_size_bytes == 0 {
            return Err(invalid("upload.max_file_size_bytes must be greater than 0"));
        }
        if self.upload.progress_step == 0 || self.upload.progress_step > 100 {
            return Err(invalid("upload.progress_step must be between 1 and 100"));
        }
        if self.upload.step_delay_ms == 0 {
            return Err(invalid("upload.step_delay_ms must be greater than 0"));
        }

        // Validate database config
        if !(0.0..=1.0).contains(&self.database.success_probability) {
            return Err(invalid(format!(
                "database.success_probability must be within [0, 1], got {}",
                self.database.success_probability
            )));
        }
        if self.database.history_limit == 0 {
            return Err(invalid("database.history_limit must be greater than 0"));
        }

        // Validate chat config
        self.chat.default_language.parse::<Language>()?;

        Ok(())
    }

    /// Get log level from environment or config
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }

    /// Render the effective configuration as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl OnboardingConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl UploadConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }
}

impl DatabaseSessionConfig {
    pub fn connect_delay(&self) -> Duration {
        Duration::from_millis(self.connect_delay_ms)
    }
}

impl ChatConfig {
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    /// Default reply language; falls back to French on an unknown code
    pub fn language(&self) -> Language {
        self.default_language.parse().unwrap_or(Language::Fr)
    }
}

fn invalid(message: impl Into<String>) -> PlatformError {
    PlatformError::Validation(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.upload.max_file_size_bytes, 10_485_760);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.database.history_limit, 5);
    }

    #[test]
    fn test_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = AppConfig::default();
        config.database.success_probability = 1.5;
        assert!(config.validate().is_err());
    }
}
