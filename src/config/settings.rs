//! Configuration settings for the scheduling assistant.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub working_hours: WorkingHoursConfig,
    pub scheduling: SchedulingConfig,
    pub responder: ResponderConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            PathBuf::from("sahayak.toml"),
            dirs::config_dir()
                .map(|p| p.join("sahayak/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration. Malformed working hours are rejected
    /// here so per-request code never sees an inverted window.
    pub fn validate(&self) -> Result<()> {
        if self.working_hours.start_hour >= self.working_hours.end_hour {
            return Err(ConfigError::Invalid(
                "working_hours.start_hour must be before end_hour".to_string(),
            )
            .into());
        }
        if self.working_hours.end_hour > 24 {
            return Err(
                ConfigError::Invalid("working_hours.end_hour must be <= 24".to_string()).into(),
            );
        }
        self.working_hours.timezone()?;

        if self.scheduling.default_event_minutes == 0 {
            return Err(ConfigError::Invalid(
                "scheduling.default_event_minutes must be > 0".to_string(),
            )
            .into());
        }
        if self.scheduling.min_slot_minutes == 0 {
            return Err(ConfigError::Invalid(
                "scheduling.min_slot_minutes must be > 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

/// Daily working-hours window within which free slots are considered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkingHoursConfig {
    /// Start of the working day (hour, 0-23).
    pub start_hour: u32,
    /// End of the working day (hour, 1-24).
    pub end_hour: u32,
    /// IANA timezone name the assistant operates in.
    pub timezone: String,
}

impl Default for WorkingHoursConfig {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 17,
            timezone: "Asia/Kolkata".to_string(),
        }
    }
}

impl WorkingHoursConfig {
    /// Parse the configured timezone.
    pub fn timezone(&self) -> Result<Tz> {
        Tz::from_str(&self.timezone)
            .map_err(|_| ConfigError::UnknownTimezone(self.timezone.clone()).into())
    }
}

/// Booking policy knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Default duration of a booked event, in minutes.
    pub default_event_minutes: i64,
    /// Minimum duration for a reported free slot, in minutes.
    pub min_slot_minutes: i64,
    /// Summary used when the message carries no usable title.
    pub default_summary: String,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            default_event_minutes: 30,
            min_slot_minutes: 30,
            default_summary: "Meeting with user".to_string(),
        }
    }
}

/// Conversational responder (LLM) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    /// Base URL of an OpenAI-compatible chat completions API.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// API key; falls back to the SAHAYAK_API_KEY environment variable.
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama3-70b-8192".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.working_hours.start_hour, 9);
        assert_eq!(config.working_hours.end_hour, 17);
        assert_eq!(config.scheduling.default_event_minutes, 30);
    }

    #[test]
    fn test_inverted_working_hours_rejected() {
        let toml = r#"
            [working_hours]
            start_hour = 18
            end_hour = 9
        "#;
        assert!(Config::from_toml(toml).is_err());
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let toml = r#"
            [working_hours]
            timezone = "Mars/Olympus_Mons"
        "#;
        assert!(Config::from_toml(toml).is_err());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let toml = r#"
            [scheduling]
            min_slot_minutes = 60
        "#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.scheduling.min_slot_minutes, 60);
        assert_eq!(config.scheduling.default_event_minutes, 30);
        assert_eq!(config.working_hours.timezone, "Asia/Kolkata");
    }

    #[test]
    fn test_timezone_parses() {
        let config = Config::default();
        assert_eq!(
            config.working_hours.timezone().unwrap(),
            chrono_tz::Asia::Kolkata
        );
    }
}
