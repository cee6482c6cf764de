//! Consecutive-day focus streak.
//!
//! Updated once per completed focus cycle. Minutes are credited from the
//! configured focus duration rather than measured wall time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const MIN_DAILY_GOAL_HOURS: u32 = 1;
pub const MAX_DAILY_GOAL_HOURS: u32 = 12;

/// Persisted streak statistics (`streak_data` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakData {
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub total_focused_hours: f64,
    /// Daily target in hours.
    #[serde(default = "default_daily_goal")]
    pub daily_goal: u32,
    #[serde(default)]
    pub today_focused_minutes: u32,
    #[serde(default)]
    pub last_focus_date: Option<NaiveDate>,
}

fn default_daily_goal() -> u32 {
    4
}

impl Default for StreakData {
    fn default() -> Self {
        Self {
            current_streak: 0,
            total_focused_hours: 0.0,
            daily_goal: default_daily_goal(),
            today_focused_minutes: 0,
            last_focus_date: None,
        }
    }
}

impl StreakData {
    /// Fresh stats for a guest session (one-hour goal).
    pub fn guest() -> Self {
        Self {
            daily_goal: 1,
            ..Self::default()
        }
    }

    /// Credit a completed focus cycle of `focus_minutes` on `today`.
    pub fn record_focus_complete(&mut self, today: NaiveDate, focus_minutes: u32) {
        let is_new_day = self.last_focus_date != Some(today);

        if is_new_day {
            self.current_streak = match self.last_focus_date {
                Some(last) if last.succ_opt() == Some(today) => self.current_streak + 1,
                _ => 1,
            };
            self.today_focused_minutes = focus_minutes;
        } else {
            self.today_focused_minutes += focus_minutes;
        }

        self.total_focused_hours += f64::from(focus_minutes) / 60.0;
        self.last_focus_date = Some(today);
    }

    /// Set the daily goal, clamped to 1..=12 hours.
    pub fn update_daily_goal(&mut self, hours: u32) {
        self.daily_goal = hours.clamp(MIN_DAILY_GOAL_HOURS, MAX_DAILY_GOAL_HOURS);
    }

    /// Strict variant for API input: rejects instead of clamping.
    pub fn try_update_daily_goal(&mut self, hours: u32) -> Result<(), ValidationError> {
        if !(MIN_DAILY_GOAL_HOURS..=MAX_DAILY_GOAL_HOURS).contains(&hours) {
            return Err(ValidationError::OutOfRange {
                field: "daily_goal",
                min: MIN_DAILY_GOAL_HOURS,
                max: MAX_DAILY_GOAL_HOURS,
                value: hours,
            });
        }
        self.daily_goal = hours;
        Ok(())
    }

    /// 0..=100 progress toward today's goal.
    pub fn focus_progress_pct(&self) -> u32 {
        let goal_minutes = self.daily_goal * 60;
        if goal_minutes == 0 {
            return 0;
        }
        let pct = (f64::from(self.today_focused_minutes) / f64::from(goal_minutes) * 100.0).round();
        (pct as u32).min(100)
    }
}
