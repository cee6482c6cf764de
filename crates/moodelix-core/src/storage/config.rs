//! TOML-based application configuration.
//!
//! Stores:
//! - Timer durations and auto-break switches
//! - Persistence backend selection and Supabase credentials
//! - Wallpaper storage (S3 bucket, region, public base URL)
//! - Server listen address and sounds directory
//! - Cosmetic display defaults
//!
//! Configuration is stored at `~/.config/moodelix/config.toml`. Values from
//! the environment (`NEXT_PUBLIC_SUPABASE_URL`, `AWS_ACCESS_KEY_ID`, ...)
//! override the file via [`Config::apply_env`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{ConfigError, ValidationError};
use crate::profile::{UserPreferences, WallpaperBrightness};
use crate::timer::{AutoBreakSettings, TimerDurations};

/// Timer durations in minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_focus_duration")]
    pub focus: u32,
    #[serde(default = "default_short_break")]
    pub short_break: u32,
    #[serde(default = "default_long_break")]
    pub long_break: u32,
    /// Keep the countdown running across transitions.
    #[serde(default = "default_true")]
    pub auto_advance: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoBreakConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub skip_breaks: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    Supabase,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub supabase_url: String,
    #[serde(default)]
    pub supabase_anon_key: String,
    /// Access token the CLI presents to the backend.
    #[serde(default)]
    pub access_token: String,
    /// SQLite file for the local backend; defaults to the data dir.
    #[serde(default)]
    pub sqlite_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallpaperConfig {
    #[serde(default)]
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    /// Public base URL for unsigned bucket reads, if the bucket allows it.
    #[serde(default)]
    pub public_base_url: Option<String>,
    /// Remote `/api/wallpapers` endpoint used instead of local signing.
    #[serde(default)]
    pub presign_endpoint: Option<String>,
    #[serde(default = "default_presign_expiry")]
    pub presign_expiry_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default = "default_sounds_dir")]
    pub sounds_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_blur")]
    pub blur_intensity: u32,
    #[serde(default)]
    pub wallpaper_brightness: WallpaperBrightness,
    #[serde(default)]
    pub sound_effects_enabled: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/moodelix/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub auto_break: AutoBreakConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub wallpaper: WallpaperConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

// Default functions
fn default_focus_duration() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_true() -> bool {
    true
}
fn default_region() -> String {
    "us-east-1".into()
}
fn default_presign_expiry() -> u64 {
    3600
}
fn default_listen() -> String {
    "127.0.0.1:3000".into()
}
fn default_sounds_dir() -> PathBuf {
    PathBuf::from("public/sounds")
}
fn default_blur() -> u32 {
    10
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            focus: default_focus_duration(),
            short_break: default_short_break(),
            long_break: default_long_break(),
            auto_advance: true,
        }
    }
}

impl Default for AutoBreakConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            skip_breaks: false,
        }
    }
}

impl Default for WallpaperConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: default_region(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            public_base_url: None,
            presign_endpoint: None,
            presign_expiry_secs: default_presign_expiry(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            sounds_dir: default_sounds_dir(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            blur_intensity: default_blur(),
            wallpaper_brightness: WallpaperBrightness::Normal,
            sound_effects_enabled: false,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/moodelix"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Self = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let save_err = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_err(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_err(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key in memory. Returns error if key is unknown
    /// or the value does not fit the field.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let candidate: Self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Reject schedule durations the timer would not accept.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timer_durations().validate().map_err(|e| {
            let key = match e {
                ValidationError::OutOfRange {
                    field: "shortBreak", ..
                } => "schedule.short_break",
                ValidationError::OutOfRange {
                    field: "longBreak", ..
                } => "schedule.long_break",
                _ => "schedule.focus",
            };
            ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Overlay the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Overlay values from `lookup`; both the server-style and the
    /// `NEXT_PUBLIC_` names are accepted.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let first = |names: &[&str]| names.iter().find_map(|n| lookup(n).filter(|v| !v.is_empty()));

        if let Some(url) = first(&["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"]) {
            self.storage.supabase_url = url;
        }
        if let Some(key) = first(&["SUPABASE_ANON_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"]) {
            self.storage.supabase_anon_key = key;
        }
        if let Some(id) = first(&["AWS_ACCESS_KEY_ID"]) {
            self.wallpaper.access_key_id = id;
        }
        if let Some(secret) = first(&["AWS_SECRET_ACCESS_KEY"]) {
            self.wallpaper.secret_access_key = secret;
        }
        if let Some(bucket) = first(&["AWS_S3_BUCKET", "NEXT_PUBLIC_AWS_S3_BUCKET"]) {
            self.wallpaper.bucket = bucket;
        }
        if let Some(region) = first(&["AWS_REGION", "NEXT_PUBLIC_AWS_REGION"]) {
            self.wallpaper.region = region;
        }
    }

    pub fn timer_durations(&self) -> TimerDurations {
        TimerDurations {
            focus: self.schedule.focus,
            short_break: self.schedule.short_break,
            long_break: self.schedule.long_break,
        }
    }

    pub fn auto_break_settings(&self) -> AutoBreakSettings {
        AutoBreakSettings {
            enabled: self.auto_break.enabled,
            skip_breaks: self.auto_break.skip_breaks,
            ..AutoBreakSettings::default()
        }
    }

    /// Preferences a guest starts with.
    pub fn default_preferences(&self) -> UserPreferences {
        UserPreferences {
            timer_durations: self.timer_durations(),
            auto_break_settings: self.auto_break_settings(),
            blur_intensity: self.display.blur_intensity,
            wallpaper_brightness: self.display.wallpaper_brightness,
            sound_effects_enabled: self.display.sound_effects_enabled,
        }
    }

    /// Path of the local SQLite database.
    pub fn sqlite_path(&self) -> std::io::Result<PathBuf> {
        match &self.storage.sqlite_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("moodelix.db")),
        }
    }
}
