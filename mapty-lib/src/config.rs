//src/config.rs
use comfy_table::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use thiserror::Error;
use tracing::warn;

use crate::map::{MAX_ZOOM, MIN_ZOOM};
use crate::workout::{Coords, WorkoutType};

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_CONFIG_DIR: &str = "mapty";
const CONFIG_ENV_VAR: &str = "MAPTY_CONFIG_DIR"; // Environment variable name

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine configuration directory.")]
    CannotDetermineConfigDir,
    #[error("I/O error accessing config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file (TOML): {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Failed to serialize config data (TOML): {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Invalid color name: {0}")]
    InvalidColor(String),
    #[error("Invalid location: {0}")]
    InvalidLocation(String),
    #[error("Zoom level {0} is outside the supported range 1..=19")]
    InvalidZoom(u8),
    #[error("Fit padding must be a non-negative number, got {0}")]
    InvalidPadding(f64),
}

// Define standard colors using strum for easy iteration/parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum StandardColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    DarkGrey,
    DarkRed,
    DarkGreen,
    DarkYellow,
    DarkBlue,
    DarkMagenta,
    DarkCyan,
    Grey,
}

// Helper to convert our enum to comfy_table::Color
impl From<StandardColor> for Color {
    fn from(value: StandardColor) -> Self {
        match value {
            StandardColor::Black => Self::Black,
            StandardColor::Red => Self::Red,
            StandardColor::Green => Self::Green,
            StandardColor::Yellow => Self::Yellow,
            StandardColor::Blue => Self::Blue,
            StandardColor::Magenta => Self::Magenta,
            StandardColor::Cyan => Self::Cyan,
            StandardColor::White => Self::White,
            StandardColor::DarkGrey => Self::DarkGrey,
            StandardColor::DarkRed => Self::DarkRed,
            StandardColor::DarkGreen => Self::DarkGreen,
            StandardColor::DarkYellow => Self::DarkYellow,
            StandardColor::DarkBlue => Self::DarkBlue,
            StandardColor::DarkMagenta => Self::DarkMagenta,
            StandardColor::DarkCyan => Self::DarkCyan,
            StandardColor::Grey => Self::Grey,
        }
    }
}

// Helper to parse a string into our StandardColor enum
pub fn parse_color(color_str: &str) -> Result<StandardColor, ConfigError> {
    StandardColor::iter()
        .find(|color| format!("{color:?}").eq_ignore_ascii_case(color_str.trim()))
        .ok_or_else(|| ConfigError::InvalidColor(color_str.to_string()))
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationConfig {
    #[must_use]
    pub const fn coords(&self) -> Coords {
        Coords::new(self.latitude, self.longitude)
    }
}

impl From<Coords> for LocationConfig {
    fn from(value: Coords) -> Self {
        Self {
            latitude: value.lat,
            longitude: value.lng,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    pub zoom: u8,
    pub fit_padding: f64,
    pub animate: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: 13,
            fit_padding: 0.1,
            animate: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FormConfig {
    /// Delay before a hidden form gets its layout back.
    pub restore_delay_ms: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            restore_delay_ms: 1000,
        }
    }
}

impl FormConfig {
    #[must_use]
    pub const fn restore_delay(&self) -> Duration {
        Duration::from_millis(self.restore_delay_ms)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)] // Ensure defaults are used if fields are missing
pub struct Theme {
    pub header_color: String,
    pub running_color: String,
    pub cycling_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            header_color: "Green".to_string(),
            running_color: "Green".to_string(),
            cycling_color: "Yellow".to_string(),
        }
    }
}

impl Theme {
    /// Color used for a workout type's markers and list accents.
    /// Falls back to the default theme color if the configured name is invalid.
    #[must_use]
    pub fn color_for(&self, workout_type: WorkoutType) -> StandardColor {
        let (configured, fallback) = match workout_type {
            WorkoutType::Running => (&self.running_color, StandardColor::Green),
            WorkoutType::Cycling => (&self.cycling_color, StandardColor::Yellow),
        };
        parse_color(configured).unwrap_or_else(|e| {
            warn!("{e}; using {fallback:?}");
            fallback
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)] // Ensure defaults are used if fields are missing
pub struct Config {
    /// Position reported to the geolocation source; `None` means unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationConfig>,
    pub map: MapConfig,
    pub form: FormConfig,
    pub theme: Theme,
}

impl Config {
    /// Checks ranges that TOML types alone cannot express.
    /// # Errors
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(location) = &self.location {
            let coords = location.coords();
            if !coords.is_valid() {
                return Err(ConfigError::InvalidLocation(coords.to_string()));
            }
        }
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&self.map.zoom) {
            return Err(ConfigError::InvalidZoom(self.map.zoom));
        }
        if !self.map.fit_padding.is_finite() || self.map.fit_padding < 0.0 {
            return Err(ConfigError::InvalidPadding(self.map.fit_padding));
        }
        parse_color(&self.theme.header_color)?;
        parse_color(&self.theme.running_color)?;
        parse_color(&self.theme.cycling_color)?;
        Ok(())
    }
}

/// Determines the path to the configuration file.
/// Exposed at crate root as `get_config_path_util`
pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir_override = std::env::var(CONFIG_ENV_VAR).ok();

    let config_dir_path = if let Some(path_str) = config_dir_override {
        let path = PathBuf::from(path_str);
        if !path.is_dir() {
            warn!(
                "Environment variable {} points to '{}', which is not a directory. Trying to create it.",
                CONFIG_ENV_VAR,
                path.display()
            );
            fs::create_dir_all(&path)?;
        }
        path
    } else {
        let base_config_dir = dirs::config_dir().ok_or(ConfigError::CannotDetermineConfigDir)?;
        base_config_dir.join(APP_CONFIG_DIR)
    };

    if !config_dir_path.exists() {
        fs::create_dir_all(&config_dir_path)?;
    }

    Ok(config_dir_path.join(CONFIG_FILE_NAME))
}

/// Loads the configuration from the TOML file at the given path,
/// writing a default file first if none exists.
/// Exposed at crate root as `load_config_util`
pub fn load(config_path: &Path) -> Result<Config, ConfigError> {
    if config_path.exists() {
        let config_content = fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&config_content)?;
        config.validate()?;
        Ok(config)
    } else {
        let default_config = Config::default();
        save(config_path, &default_config)?;
        Ok(default_config)
    }
}

/// Saves the configuration to the TOML file.
/// Exposed at crate root as `save_config_util`
pub fn save(config_path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent_dir) = config_path.parent() {
        if !parent_dir.exists() {
            fs::create_dir_all(parent_dir)?;
        }
    }
    let config_content = toml::to_string_pretty(config)?;
    fs::write(config_path, config_content)?;
    Ok(())
}
