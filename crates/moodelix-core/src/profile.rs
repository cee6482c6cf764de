//! Signed-in user profile, streak row and saved preferences.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::timer::{AutoBreakSettings, StreakData, TimerDurations};

pub const MAX_BLUR_INTENSITY: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallpaperBrightness {
    Darker,
    Dark,
    #[default]
    Normal,
    Bright,
}

impl WallpaperBrightness {
    /// CSS brightness multiplier applied to the background.
    pub fn factor(&self) -> f32 {
        match self {
            WallpaperBrightness::Darker => 0.4,
            WallpaperBrightness::Dark => 0.6,
            WallpaperBrightness::Normal => 0.8,
            WallpaperBrightness::Bright => 1.0,
        }
    }
}

/// `user_preferences` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub timer_durations: TimerDurations,
    #[serde(default)]
    pub auto_break_settings: AutoBreakSettings,
    #[serde(default = "default_blur")]
    pub blur_intensity: u32,
    #[serde(default)]
    pub wallpaper_brightness: WallpaperBrightness,
    #[serde(default)]
    pub sound_effects_enabled: bool,
}

fn default_blur() -> u32 {
    10
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            timer_durations: TimerDurations::default(),
            auto_break_settings: AutoBreakSettings::default(),
            blur_intensity: default_blur(),
            wallpaper_brightness: WallpaperBrightness::Normal,
            sound_effects_enabled: false,
        }
    }
}

impl UserPreferences {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.timer_durations.validate()?;
        self.auto_break_settings.validate()?;
        if self.blur_intensity > MAX_BLUR_INTENSITY {
            return Err(ValidationError::OutOfRange {
                field: "blur_intensity",
                min: 0,
                max: MAX_BLUR_INTENSITY,
                value: self.blur_intensity,
            });
        }
        Ok(())
    }
}

/// `profiles` row joined with its streak and preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub streak_data: StreakData,
    #[serde(default)]
    pub preferences: UserPreferences,
}
