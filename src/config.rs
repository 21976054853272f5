//! Configuration loading and management
//!
//! Handles parsing of `scrumboard.toml` in the data directory.

use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File name of the configuration inside the data directory
pub const CONFIG_FILE: &str = "scrumboard.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Defaults for cards created on the board
    #[serde(default)]
    pub cards: CardDefaults,

    /// Draft ingestion settings
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Values given to a card created from the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDefaults {
    #[serde(default = "default_card_title")]
    pub default_title: String,

    #[serde(default = "default_card_description")]
    pub default_description: String,

    #[serde(default = "default_story_points")]
    pub default_story_points: u32,
}

fn default_card_title() -> String {
    "New card".to_string()
}

fn default_card_description() -> String {
    "Describe the work...".to_string()
}

fn default_story_points() -> u32 {
    1
}

impl Default for CardDefaults {
    fn default() -> Self {
        Self {
            default_title: default_card_title(),
            default_description: default_card_description(),
            default_story_points: default_story_points(),
        }
    }
}

/// Draft ingestion configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Length of every sprint (e.g., "15d")
    #[serde(default = "default_sprint_length")]
    pub sprint_length: String,

    /// Hour budget for imported projects when none is given
    #[serde(default = "default_total_hours", skip_serializing_if = "Option::is_none")]
    pub default_total_hours: Option<f64>,
}

fn default_sprint_length() -> String {
    "15d".to_string()
}

fn default_total_hours() -> Option<f64> {
    Some(40.0)
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            sprint_length: default_sprint_length(),
            default_total_hours: default_total_hours(),
        }
    }
}

impl IngestConfig {
    pub fn sprint_duration(&self) -> Result<Duration> {
        let duration = parse_duration(&self.sprint_length)
            .map_err(|err| Error::InvalidConfig(format!("ingest.sprint_length: {err}")))?;
        if duration <= Duration::zero() {
            return Err(Error::InvalidConfig(
                "ingest.sprint_length must be > 0".to_string(),
            ));
        }
        Ok(duration)
    }

    fn validate(&self) -> Result<()> {
        self.sprint_duration()?;
        if let Some(hours) = self.default_total_hours {
            if !hours.is_finite() || hours <= 0.0 {
                return Err(Error::InvalidConfig(
                    "ingest.default_total_hours must be > 0".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl CardDefaults {
    fn validate(&self) -> Result<()> {
        if self.default_title.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "cards.default_title cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the data directory, or return defaults
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.cards.validate()?;
        self.ingest.validate()?;
        Ok(())
    }
}

/// Parse a duration string like "15d", "36h", "2w".
///
/// A bare number is read as days.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    if s.is_empty() {
        return Err(Error::InvalidArgument("Duration cannot be empty".to_string()));
    }

    let (num_str, unit) = if let Some(pos) = s.find(|c: char| !c.is_ascii_digit()) {
        (&s[..pos], &s[pos..])
    } else {
        (s, "d")
    };

    let num: i64 = num_str.parse().map_err(|_| {
        Error::InvalidArgument(format!("Invalid duration number: {}", num_str))
    })?;

    let duration = match unit.trim().to_lowercase().as_str() {
        "s" | "sec" | "second" | "seconds" => Duration::try_seconds(num),
        "m" | "min" | "minute" | "minutes" => Duration::try_minutes(num),
        "h" | "hr" | "hour" | "hours" => Duration::try_hours(num),
        "d" | "day" | "days" => Duration::try_days(num),
        "w" | "week" | "weeks" => Duration::try_weeks(num),
        _ => {
            return Err(Error::InvalidArgument(format!(
                "Invalid duration unit '{}'. Expected: s, m, h, d, w",
                unit
            )));
        }
    };

    duration.ok_or_else(|| Error::InvalidArgument(format!("Duration out of range: {}", s)))
}
