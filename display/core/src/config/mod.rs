//! TOML Configuration File Support
//!
//! Configuration for the display, read once at startup from
//! `~/.config/roomboard/display.toml` and never written by the core.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables (`ROOMBOARD_*`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! The configuration file follows XDG Base Directory specification:
//! - `$XDG_CONFIG_HOME/roomboard/display.toml` (typically `~/.config/roomboard/display.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! [api]
//! address = "http://bookings.local:37222"
//! room_id = 4
//! timezone = "Europe/Berlin"
//! poll_interval_ms = 1000
//! request_timeout_ms = 5000
//!
//! [texts]
//! unbooked_name = "Meeting room 4"
//! unbooked_info = "Bookable through Slack"
//! unbooked_status = "Free"
//! booked_by_prefix = "Booked by "
//!
//! [limits]
//! name_max_chars = 43
//! username_max_chars = 35
//! upcoming_name_max_chars = 17
//!
//! [colors]
//! background = "#202030"
//! unbooked = "#82D173"
//! booked = "#2F4858"
//! ```

pub mod timezone;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::messages::Rgb;

pub use timezone::{system_timezone_id, url_safe_timezone};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[api]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiToml {
    /// Backend base address
    pub address: Option<String>,
    /// Room to display
    pub room_id: Option<u32>,
    /// IANA timezone id; detected from the system when absent
    pub timezone: Option<String>,
    /// Poll cadence in milliseconds
    pub poll_interval_ms: Option<u64>,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: Option<u64>,
}

/// `[texts]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextsToml {
    /// Headline when the room is free
    pub unbooked_name: Option<String>,
    /// Info line when the room is free
    pub unbooked_info: Option<String>,
    /// Status line when the room is free
    pub unbooked_status: Option<String>,
    /// Prepended to the booking user's name
    pub booked_by_prefix: Option<String>,
}

/// `[limits]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsToml {
    /// Headline limit
    pub name_max_chars: Option<usize>,
    /// Info line limit
    pub username_max_chars: Option<usize>,
    /// Upcoming booking name limit
    pub upcoming_name_max_chars: Option<usize>,
}

/// `[colors]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsToml {
    /// Background fill
    pub background: Option<Rgb>,
    /// Strip color while the room is free
    pub unbooked: Option<Rgb>,
    /// Strip color while the room is booked
    pub booked: Option<Rgb>,
    /// Strip color after a failed fetch
    pub error: Option<Rgb>,
}

/// Root TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayToml {
    /// Backend connection
    pub api: ApiToml,
    /// Default texts
    pub texts: TextsToml,
    /// Truncation limits
    pub limits: LimitsToml,
    /// Palette
    pub colors: ColorsToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Backend connection settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    /// Backend base address, e.g. `http://127.0.0.1:37222`
    pub address: String,
    /// Room to display
    pub room_id: u32,
    /// Pinned IANA timezone id
    pub timezone: Option<String>,
    /// Poll cadence
    pub poll_interval: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:37222".to_string(),
            room_id: 1,
            timezone: None,
            poll_interval: Duration::from_millis(1000),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Texts shown when the room is unbooked
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextsConfig {
    /// Headline
    pub unbooked_name: String,
    /// Info line
    pub unbooked_info: String,
    /// Status line
    pub unbooked_status: String,
    /// Prefix for the booking user's name
    pub booked_by_prefix: String,
}

impl Default for TextsConfig {
    fn default() -> Self {
        Self {
            unbooked_name: "Configure me please!".to_string(),
            unbooked_info: "Bookable through Slack".to_string(),
            unbooked_status: "Free".to_string(),
            booked_by_prefix: "Booked by ".to_string(),
        }
    }
}

/// Maximum characters before truncation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LimitsConfig {
    /// Headline
    pub name_max_chars: usize,
    /// Info line, prefix included
    pub username_max_chars: usize,
    /// Upcoming slot names
    pub upcoming_name_max_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            name_max_chars: 43,
            username_max_chars: 35,
            upcoming_name_max_chars: 17,
        }
    }
}

/// Display palette
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorsConfig {
    /// Background fill
    pub background: Rgb,
    /// Strip color while free
    pub unbooked: Rgb,
    /// Strip color while booked
    pub booked: Rgb,
    /// Strip color after a failed fetch
    pub error: Rgb,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            background: Rgb::new(0x20, 0x20, 0x30),
            unbooked: Rgb::new(0x82, 0xD1, 0x73),
            booked: Rgb::new(0x2F, 0x48, 0x58),
            error: Rgb::BLACK,
        }
    }
}

/// Complete display configuration
///
/// Immutable once loaded; components borrow it at construction.
#[derive(Clone, Debug)]
pub struct DisplayConfig {
    /// Backend connection
    pub api: ApiConfig,
    /// Unbooked texts and booked-by prefix
    pub texts: TextsConfig,
    /// Truncation limits
    pub limits: LimitsConfig,
    /// Palette
    pub colors: ColorsConfig,
    /// Path to the config file (if loaded from file)
    pub config_file_path: Option<PathBuf>,
    source: ConfigSource,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            texts: TextsConfig::default(),
            limits: LimitsConfig::default(),
            colors: ColorsConfig::default(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl DisplayConfig {
    /// Create configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the configuration source
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// The timezone id to use
    ///
    /// A pinned timezone wins; otherwise the system timezone is detected
    /// on every call.
    #[must_use]
    pub fn timezone_id(&self) -> String {
        self.api
            .timezone
            .clone()
            .unwrap_or_else(system_timezone_id)
    }

    /// Reject values that would stall the display loop
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a zero poll interval or an empty address.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.poll_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if self.api.address.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api address must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/roomboard/display.toml`
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("roomboard").join("display.toml"))
}

/// Load configuration from the default location
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
pub fn load_config() -> Result<DisplayConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// A missing file is not an error; defaults are used instead.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed, or if
/// the resulting configuration is invalid.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<DisplayConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

fn load_config_with_env(
    path: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<DisplayConfig, ConfigError> {
    let mut config = DisplayConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: DisplayToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;

    Ok(config)
}

fn apply_toml_config(config: &mut DisplayConfig, toml: &DisplayToml) {
    // API settings
    if let Some(ref address) = toml.api.address {
        config.api.address = address.clone();
    }
    if let Some(room_id) = toml.api.room_id {
        config.api.room_id = room_id;
    }
    if toml.api.timezone.is_some() {
        config.api.timezone = toml.api.timezone.clone();
    }
    if let Some(ms) = toml.api.poll_interval_ms {
        config.api.poll_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.api.request_timeout_ms {
        config.api.request_timeout = Duration::from_millis(ms);
    }

    // Texts
    if let Some(ref text) = toml.texts.unbooked_name {
        config.texts.unbooked_name = text.clone();
    }
    if let Some(ref text) = toml.texts.unbooked_info {
        config.texts.unbooked_info = text.clone();
    }
    if let Some(ref text) = toml.texts.unbooked_status {
        config.texts.unbooked_status = text.clone();
    }
    if let Some(ref text) = toml.texts.booked_by_prefix {
        config.texts.booked_by_prefix = text.clone();
    }

    // Limits
    if let Some(n) = toml.limits.name_max_chars {
        config.limits.name_max_chars = n;
    }
    if let Some(n) = toml.limits.username_max_chars {
        config.limits.username_max_chars = n;
    }
    if let Some(n) = toml.limits.upcoming_name_max_chars {
        config.limits.upcoming_name_max_chars = n;
    }

    // Colors
    if let Some(color) = toml.colors.background {
        config.colors.background = color;
    }
    if let Some(color) = toml.colors.unbooked {
        config.colors.unbooked = color;
    }
    if let Some(color) = toml.colors.booked {
        config.colors.booked = color;
    }
    if let Some(color) = toml.colors.error {
        config.colors.error = color;
    }
}

fn apply_env_config(config: &mut DisplayConfig, env: impl Fn(&str) -> Option<String>) {
    if let Some(address) = env("ROOMBOARD_API_ADDRESS") {
        config.api.address = address;
        config.source = ConfigSource::Env;
    }
    if let Some(room_id) = env("ROOMBOARD_ROOM_ID") {
        match room_id.parse::<u32>() {
            Ok(id) => {
                config.api.room_id = id;
                config.source = ConfigSource::Env;
            }
            Err(_) => tracing::warn!(value = %room_id, "Ignoring invalid ROOMBOARD_ROOM_ID"),
        }
    }
    if let Some(tz) = env("ROOMBOARD_TIMEZONE") {
        config.api.timezone = Some(tz);
        config.source = ConfigSource::Env;
    }
    if let Some(interval) = env("ROOMBOARD_POLL_INTERVAL_MS") {
        if let Ok(ms) = interval.parse::<u64>() {
            config.api.poll_interval = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(timeout) = env("ROOMBOARD_REQUEST_TIMEOUT_MS") {
        if let Ok(ms) = timeout.parse::<u64>() {
            config.api.request_timeout = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// CLI argument overrides
///
/// Use this to apply command-line arguments on top of file/env config.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Override backend address
    pub api_address: Option<String>,

    /// Override room id
    pub room_id: Option<u32>,

    /// Override timezone id
    pub timezone: Option<String>,
}

impl ConfigOverrides {
    /// Create empty overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set backend address override
    #[must_use]
    pub fn with_api_address(mut self, address: String) -> Self {
        self.api_address = Some(address);
        self
    }

    /// Set room id override
    #[must_use]
    pub fn with_room_id(mut self, room_id: u32) -> Self {
        self.room_id = Some(room_id);
        self
    }

    /// Set timezone override
    #[must_use]
    pub fn with_timezone(mut self, timezone: String) -> Self {
        self.timezone = Some(timezone);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut DisplayConfig) {
        if self.api_address.is_some() || self.room_id.is_some() || self.timezone.is_some() {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref address) = self.api_address {
            config.api.address = address.clone();
        }
        if let Some(room_id) = self.room_id {
            config.api.room_id = room_id;
        }
        if let Some(ref tz) = self.timezone {
            config.api.timezone = Some(tz.clone());
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
