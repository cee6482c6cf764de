use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{FocusMode, ScheduledBreak, StreakData};

/// Every timer state change produces an Event.
/// Front ends render them; the CLI prints them as JSON lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: FocusMode,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    /// A new focus session was planned and started.
    FocusSessionStarted {
        total_minutes: u32,
        first_segment_secs: u32,
        breaks: Vec<ScheduledBreak>,
        break_duration_min: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: FocusMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    ModeSwitched {
        mode: FocusMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// Countdown hit a scheduled checkpoint; pause begins.
    BreakStarted {
        break_id: String,
        duration_min: u32,
        at: DateTime<Utc>,
    },
    BreakSkipped {
        break_id: String,
        at: DateTime<Utc>,
    },
    /// Pause finished; the next focus segment is ready.
    SegmentResumed {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// Whole configured focus duration finished; streak credited.
    FocusCycleCompleted {
        focus_minutes: u32,
        streak: StreakData,
        at: DateTime<Utc>,
    },
    /// A plain break (no session in progress) ran out.
    BreakCompleted {
        mode: FocusMode,
        at: DateTime<Utc>,
    },
    DurationChanged {
        mode: FocusMode,
        minutes: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: FocusMode,
        running: bool,
        remaining_secs: u32,
        total_secs: u32,
        scheduled_breaks: Vec<ScheduledBreak>,
        streak: StreakData,
        at: DateTime<Utc>,
    },
}
