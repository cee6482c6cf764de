//! Focus timer engine.
//!
//! A three-mode countdown (focus, short break, long break). The engine has
//! no internal thread: the caller invokes `tick()` once per second while
//! the timer runs. Drift from a throttled caller is not corrected.
//!
//! ## Transitions on reaching zero
//!
//! ```text
//! focus  --(pending checkpoint)-->  shortBreak (break_duration)
//! focus  --(no checkpoint left)-->  shortBreak (short_break), streak credited
//! shortBreak --(session running)--> focus (remaining segment)
//! shortBreak / longBreak ---------> focus (full duration)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(TimerDurations::default(), AutoBreakSettings::default());
//! engine.start();
//! // once per second:
//! engine.tick(); // Returns Some(Event) on a transition
//! ```

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::breaks::{calculate_auto_breaks, calculate_break_duration, AutoBreakSettings, ScheduledBreak};
use super::streak::StreakData;
use crate::error::ValidationError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FocusMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl FocusMode {
    pub fn label(&self) -> &'static str {
        match self {
            FocusMode::Focus => "Focus",
            FocusMode::ShortBreak => "Short Break",
            FocusMode::LongBreak => "Long Break",
        }
    }

    /// Inclusive minute bounds for the configured duration of this mode.
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            FocusMode::Focus => (25, 240),
            FocusMode::ShortBreak | FocusMode::LongBreak => (1, 60),
        }
    }
}

impl std::str::FromStr for FocusMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(FocusMode::Focus),
            "shortBreak" | "short-break" | "short" => Ok(FocusMode::ShortBreak),
            "longBreak" | "long-break" | "long" => Ok(FocusMode::LongBreak),
            other => Err(ValidationError::InvalidValue {
                field: "mode".into(),
                message: format!("unknown mode '{other}'"),
            }),
        }
    }
}

/// Configured target minutes per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerDurations {
    pub focus: u32,
    pub short_break: u32,
    pub long_break: u32,
}

impl Default for TimerDurations {
    fn default() -> Self {
        Self {
            focus: 25,
            short_break: 5,
            long_break: 15,
        }
    }
}

impl TimerDurations {
    pub fn minutes(&self, mode: FocusMode) -> u32 {
        match mode {
            FocusMode::Focus => self.focus,
            FocusMode::ShortBreak => self.short_break,
            FocusMode::LongBreak => self.long_break,
        }
    }

    fn slot(&mut self, mode: FocusMode) -> &mut u32 {
        match mode {
            FocusMode::Focus => &mut self.focus,
            FocusMode::ShortBreak => &mut self.short_break,
            FocusMode::LongBreak => &mut self.long_break,
        }
    }

    /// Copy with every field pulled into its mode bounds.
    pub fn clamped(mut self) -> Self {
        for mode in [FocusMode::Focus, FocusMode::ShortBreak, FocusMode::LongBreak] {
            let (min, max) = mode.bounds();
            let slot = self.slot(mode);
            *slot = (*slot).clamp(min, max);
        }
        self
    }

    /// Validate every field against its mode bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for mode in [FocusMode::Focus, FocusMode::ShortBreak, FocusMode::LongBreak] {
            check_bounds(mode, self.minutes(mode))?;
        }
        Ok(())
    }
}

fn check_bounds(mode: FocusMode, minutes: u32) -> Result<(), ValidationError> {
    let (min, max) = mode.bounds();
    if (min..=max).contains(&minutes) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: match mode {
                FocusMode::Focus => "focus",
                FocusMode::ShortBreak => "shortBreak",
                FocusMode::LongBreak => "longBreak",
            },
            min,
            max,
            value: minutes,
        })
    }
}

/// Checkpoint bookkeeping for the focus session in progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FocusPlan {
    total_minutes: u32,
    breaks: Vec<ScheduledBreak>,
    /// Offset (minutes) where the current focus segment began.
    segment_start_min: u32,
}

impl FocusPlan {
    fn new(total_minutes: u32, breaks: Vec<ScheduledBreak>) -> Self {
        Self {
            total_minutes,
            breaks,
            segment_start_min: 0,
        }
    }

    fn next_pending(&self) -> Option<&ScheduledBreak> {
        self.breaks.iter().find(|b| b.is_pending())
    }

    /// End of the current segment: next pending checkpoint or session end.
    fn segment_end_min(&self) -> u32 {
        self.next_pending()
            .map(|b| b.time_offset_minutes)
            .unwrap_or(self.total_minutes)
    }

    fn remaining_segment_secs(&self) -> u32 {
        self.segment_end_min().saturating_sub(self.segment_start_min) * 60
    }

    fn is_finished(&self) -> bool {
        self.segment_start_min >= self.total_minutes
    }
}

/// Core focus timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    mode: FocusMode,
    remaining_secs: u32,
    running: bool,
    durations: TimerDurations,
    auto_break: AutoBreakSettings,
    #[serde(default)]
    plan: Option<FocusPlan>,
    #[serde(default = "StreakData::guest")]
    streak: StreakData,
    /// Keep counting after a transition instead of stopping.
    #[serde(default)]
    auto_continue: bool,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(TimerDurations::default(), AutoBreakSettings::default())
    }
}

impl TimerEngine {
    /// Create an idle engine in focus mode showing the full focus duration.
    /// Out-of-range durations are clamped.
    pub fn new(durations: TimerDurations, auto_break: AutoBreakSettings) -> Self {
        let durations = durations.clamped();
        Self {
            mode: FocusMode::Focus,
            remaining_secs: durations.focus * 60,
            running: false,
            durations,
            auto_break,
            plan: None,
            streak: StreakData::guest(),
            auto_continue: false,
        }
    }

    pub fn with_streak(mut self, streak: StreakData) -> Self {
        self.streak = streak;
        self
    }

    pub fn with_auto_continue(mut self, enabled: bool) -> Self {
        self.auto_continue = enabled;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> FocusMode {
        self.mode
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn durations(&self) -> TimerDurations {
        self.durations
    }

    pub fn auto_break(&self) -> AutoBreakSettings {
        self.auto_break
    }

    pub fn streak(&self) -> &StreakData {
        &self.streak
    }

    pub fn scheduled_breaks(&self) -> &[ScheduledBreak] {
        self.plan.as_ref().map(|p| p.breaks.as_slice()).unwrap_or(&[])
    }

    pub fn session_in_progress(&self) -> bool {
        self.plan.is_some()
    }

    /// `MM:SS` display of the countdown.
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            running: self.running,
            remaining_secs: self.remaining_secs,
            total_secs: self.durations.minutes(self.mode) * 60,
            scheduled_breaks: self.scheduled_breaks().to_vec(),
            streak: self.streak.clone(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume the countdown.
    ///
    /// In focus mode without a session in progress this plans a new session:
    /// the pause length is recomputed for the focus duration and the
    /// checkpoints are scheduled (none when auto-break is off or skipped).
    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return None;
        }
        if self.mode == FocusMode::Focus && self.plan.is_none() {
            return Some(self.start_focus_session());
        }
        self.running = true;
        Some(Event::TimerStarted {
            mode: self.mode,
            duration_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    fn start_focus_session(&mut self) -> Event {
        let total = self.durations.focus;
        self.auto_break.break_duration = calculate_break_duration(total);

        let breaks = if self.auto_break.active() {
            calculate_auto_breaks(total)
        } else {
            Vec::new()
        };
        let plan = FocusPlan::new(total, breaks);
        self.remaining_secs = plan.remaining_segment_secs();
        let event = Event::FocusSessionStarted {
            total_minutes: total,
            first_segment_secs: self.remaining_secs,
            breaks: plan.breaks.clone(),
            break_duration_min: self.auto_break.break_duration,
            at: Utc::now(),
        };
        self.plan = Some(plan);
        self.running = true;
        event
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        Some(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Stop and restore the current mode's full duration.
    pub fn reset(&mut self) -> Option<Event> {
        self.running = false;
        self.plan = None;
        self.remaining_secs = self.durations.minutes(self.mode) * 60;
        Some(Event::TimerReset {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Manual mode change: stops, loads that mode's duration, and discards
    /// any checkpoint bookkeeping.
    pub fn switch_mode(&mut self, mode: FocusMode) -> Option<Event> {
        self.mode = mode;
        self.running = false;
        self.plan = None;
        self.remaining_secs = self.durations.minutes(mode) * 60;
        Some(Event::ModeSwitched {
            mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Mark a scheduled checkpoint skipped.
    ///
    /// Skipping the checkpoint the current focus segment is counting toward
    /// extends the countdown to the following checkpoint (or session end).
    pub fn skip_break(&mut self, break_id: &str) -> Option<Event> {
        let mode = self.mode;
        let plan = self.plan.as_mut()?;
        let upcoming = plan.next_pending().map(|b| b.id.clone());
        let target = plan.breaks.iter_mut().find(|b| b.id == break_id && b.is_pending())?;
        target.skipped = true;

        if mode == FocusMode::Focus && upcoming.as_deref() == Some(break_id) {
            let skipped_at = target.time_offset_minutes;
            let extension = plan.segment_end_min().saturating_sub(skipped_at) * 60;
            self.remaining_secs += extension;
        }
        Some(Event::BreakSkipped {
            break_id: break_id.to_string(),
            at: Utc::now(),
        })
    }

    pub fn set_auto_break(&mut self, settings: AutoBreakSettings) {
        self.auto_break = settings;
    }

    /// Add one minute to `mode`'s configured duration.
    pub fn increase_duration(&mut self, mode: FocusMode) -> Result<Event, ValidationError> {
        let (_, max) = mode.bounds();
        let next = (self.durations.minutes(mode) + 1).min(max);
        self.apply_duration(mode, next, |remaining| (remaining + 60).min(max * 60))
    }

    /// Remove one minute from `mode`'s configured duration.
    pub fn decrease_duration(&mut self, mode: FocusMode) -> Result<Event, ValidationError> {
        let (min, _) = mode.bounds();
        let next = self.durations.minutes(mode).saturating_sub(1).max(min);
        self.apply_duration(mode, next, |remaining| remaining.saturating_sub(60).max(min * 60))
    }

    /// Direct numeric entry; out-of-range values are rejected.
    pub fn set_duration(&mut self, mode: FocusMode, minutes: u32) -> Result<Event, ValidationError> {
        check_bounds(mode, minutes)?;
        self.apply_duration(mode, minutes, |_| minutes * 60)
    }

    fn apply_duration(
        &mut self,
        mode: FocusMode,
        minutes: u32,
        display: impl FnOnce(u32) -> u32,
    ) -> Result<Event, ValidationError> {
        if self.running {
            return Err(ValidationError::TimerRunning);
        }
        *self.durations.slot(mode) = minutes;
        if self.mode == mode {
            self.remaining_secs = display(self.remaining_secs);
            if mode == FocusMode::Focus {
                self.plan = None;
            }
        }
        Ok(Event::DurationChanged {
            mode,
            minutes,
            at: Utc::now(),
        })
    }

    /// Call once per second. Returns an event when the countdown transitions.
    pub fn tick(&mut self) -> Option<Event> {
        self.tick_on(Local::now().date_naive())
    }

    /// `tick()` with an explicit calendar day for streak bookkeeping.
    pub fn tick_on(&mut self, today: NaiveDate) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }
        self.running = false;
        let event = match self.mode {
            FocusMode::Focus => self.finish_focus_segment(today),
            FocusMode::ShortBreak => self.finish_short_break(),
            FocusMode::LongBreak => {
                self.enter_fresh_focus();
                Event::BreakCompleted {
                    mode: FocusMode::LongBreak,
                    at: Utc::now(),
                }
            }
        };
        if self.auto_continue {
            if self.mode == FocusMode::Focus && self.plan.is_none() {
                self.start_focus_session();
            } else {
                self.running = true;
            }
        }
        Some(event)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish_focus_segment(&mut self, today: NaiveDate) -> Event {
        let checkpoint = if self.auto_break.active() {
            self.plan.as_mut().and_then(|plan| {
                let next = plan.breaks.iter_mut().find(|b| b.is_pending())?;
                next.completed = true;
                plan.segment_start_min = next.time_offset_minutes;
                Some(next.id.clone())
            })
        } else {
            None
        };

        self.mode = FocusMode::ShortBreak;
        match checkpoint {
            Some(break_id) => {
                self.remaining_secs = self.auto_break.break_duration * 60;
                Event::BreakStarted {
                    break_id,
                    duration_min: self.auto_break.break_duration,
                    at: Utc::now(),
                }
            }
            None => {
                let focus_minutes = self.durations.focus;
                self.streak.record_focus_complete(today, focus_minutes);
                self.plan = None;
                self.remaining_secs = self.durations.short_break * 60;
                Event::FocusCycleCompleted {
                    focus_minutes,
                    streak: self.streak.clone(),
                    at: Utc::now(),
                }
            }
        }
    }

    fn finish_short_break(&mut self) -> Event {
        let next_segment = self
            .plan
            .as_ref()
            .filter(|p| !p.is_finished())
            .map(FocusPlan::remaining_segment_secs);
        match next_segment {
            Some(secs) => {
                self.mode = FocusMode::Focus;
                self.remaining_secs = secs;
                Event::SegmentResumed {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                }
            }
            None => {
                self.enter_fresh_focus();
                Event::BreakCompleted {
                    mode: FocusMode::ShortBreak,
                    at: Utc::now(),
                }
            }
        }
    }

    fn enter_fresh_focus(&mut self) {
        self.mode = FocusMode::Focus;
        self.plan = None;
        self.remaining_secs = self.durations.focus * 60;
    }
}
