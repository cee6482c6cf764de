mod breaks;
mod engine;
mod streak;

pub use breaks::{
    calculate_auto_breaks, calculate_break_duration, AutoBreakSettings, ScheduledBreak, MAX_BREAK_DURATION,
    MIN_BREAK_DURATION,
};
pub use engine::{FocusMode, TimerDurations, TimerEngine};
pub use streak::{StreakData, MAX_DAILY_GOAL_HOURS, MIN_DAILY_GOAL_HOURS};
